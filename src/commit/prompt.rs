//! Prompt construction for AI-generated commit messages.

/// Default instruction template. `{diff}` is replaced with the staged diff.
pub const DEFAULT_TEMPLATE: &str = r#"You are a professional software engineer that generates concise, clear commit messages.
Please generate a commit message in the following format and follow these rules:
1. Do not include any additional text beyond the commit message itself.
2. The commit message must consist of exactly two parts:
   - A short, descriptive title on the first line (about 50 characters).
   - A bullet-point list of changes made, each on its own line.

Given the following Git diff, please provide a short commit message in JSON with keys
`title` (string) and `changes` (array of strings). Output the keys in that order.

DIFF:
{diff}
"#;

const DIFF_PLACEHOLDER: &str = "{diff}";
const INTENT_PLACEHOLDER: &str = "{intent}";

/// Build the LLM prompt for generating a commit message.
///
/// Uses `template` when given, otherwise [`DEFAULT_TEMPLATE`]. The diff is
/// embedded verbatim. Placeholders are substituted in a single pass, so text
/// coming from the diff or the intent is never expanded again.
///
/// - A template without `{diff}` gets a trailing `DIFF:` section.
/// - A non-blank `intent` fills `{intent}`, or is added as an `INTENT:` section
///   ahead of the appended diff when the template has no such placeholder.
pub fn build_commit_prompt(diff_text: &str, template: Option<&str>, intent: Option<&str>) -> String {
    let template = template.unwrap_or(DEFAULT_TEMPLATE);
    let intent = intent.map(str::trim).filter(|i| !i.is_empty());

    let mut prompt = substitute(template, diff_text, intent.unwrap_or(""));

    if let Some(intent) = intent
        && !template.contains(INTENT_PLACEHOLDER)
    {
        prompt.push_str(&format!(
            "\n\nINTENT (why this change is made; reflect it in the title and changes):\n{intent}\n"
        ));
    }

    if !template.contains(DIFF_PLACEHOLDER) {
        prompt.push_str(&format!("\n\nDIFF:\n{diff_text}"));
    }

    prompt
}

/// Replace `{diff}` and `{intent}` in one left-to-right scan.
fn substitute(template: &str, diff_text: &str, intent: &str) -> String {
    let mut out = String::with_capacity(template.len() + diff_text.len() + intent.len());
    let mut rest = template;

    while let Some(idx) = rest.find('{') {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx..];

        if let Some(after) = tail.strip_prefix(DIFF_PLACEHOLDER) {
            out.push_str(diff_text);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(INTENT_PLACEHOLDER) {
            out.push_str(intent);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}
