// Prompts sent to the LLM. Each asks for JSON, but the extractor never assumes it got any.

pub fn related_courses(course: &str) -> String {
    format!(
        "Suggest 4 other full degree courses related to '{course}'. \
         Return only a raw JSON array of course names."
    )
}

pub fn roadmap(course: &str) -> String {
    format!(
        "You are an expert mentor and a caring parent helping your child succeed in the course '{course}'.

Create a deeply structured, step-by-step 4-year roadmap that takes a complete beginner to expert level.
Organize everything in a proper hierarchy as valid JSON.
Include:
1. Semester-wise academic curriculum
2. Skills to build
3. Online course recommendations
4. Learning milestones
5. Project ideas
6. Portfolio building
7. Personality development
8. Events to join
9. Internship search strategy
10. Final year placement guide

Root key: \"roadmap\". Output only valid JSON."
    )
}
