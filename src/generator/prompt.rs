//! Fixed README prompt template.

/// Numbered instructions that follow the repository context.
pub const README_INSTRUCTIONS: &str = "\
Instructions:
1. Infer the project's purpose, main features and technology stack using only the context above.
2. Write a README with the standard sections: project title, short description, features, \
tech stack, installation, usage, configuration (if any), contributing and license (if known).
3. Do not invent facts, commands, URLs or badges that the context does not imply. \
When something is unknown, leave the section generic or omit it.
4. Format the whole answer as GitHub-flavored Markdown and return only the README content.";

/// Picks a backtick fence longer than any backtick run inside `content`,
/// so the context cannot close the block early.
fn fence_for(content: &str) -> String {
    let mut longest = 0;
    let mut current = 0;
    for c in content.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

/// Builds the prompt sent to the model for one repository.
///
/// The context is embedded verbatim.
pub fn build_readme_prompt(repo_url: &str, context: &str) -> String {
    let fence = fence_for(context);
    format!(
        "You are an expert technical writer. Generate a high-quality README.md for the \
         repository at {url}.\n\n\
         Here is a summary of the repository: its file structure and the contents of some \
         key files.\n\n\
         {fence}\n{context}\n{fence}\n\n\
         {instructions}\n",
        url = repo_url,
        fence = fence,
        context = context,
        instructions = README_INSTRUCTIONS,
    )
}
