/// Rule pomdesc: a Maven POM must describe the project
///
/// Checks the artifactId format, the title (`<name>`), a description of at least three
/// words and the organization name. Every problem found becomes a detail record.
use crate::markup::Document;
use crate::rule::{Details, Rule, RuleInput, RuleOptions, ValidationResult, Verdict};
use regex::Regex;
use std::sync::LazyLock;

static PROJECT_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]*$").unwrap());

const MIN_DESCRIPTION_WORDS: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct PomDescription;

impl Rule for PomDescription {
    fn name(&self) -> &'static str {
        "pomdesc"
    }

    fn message(&self) -> &'static str {
        "has incomplete Maven POM description"
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        _options: Option<&RuleOptions>,
        details: &mut Details,
    ) -> ValidationResult {
        let document = match Document::parse(input.content) {
            Ok(document) => document,
            Err(e) => {
                details.push(e.to_string());
                return Ok(Verdict::Fail);
            }
        };
        let project = &document.root;

        let name = project.find_text("artifactId").unwrap_or("").trim();
        let mut title = project.find_text("name").unwrap_or("").trim();
        if title == "${project.artifactId}" {
            title = name;
        }
        let description = project.find_text("description").unwrap_or("").trim();
        let organization = project
            .find("organization")
            .and_then(|org| org.find_text("name"))
            .unwrap_or("")
            .trim();

        if !PROJECT_NAME_REGEX.is_match(name) {
            details.push(format!(
                "has invalid name (does not match {})",
                PROJECT_NAME_REGEX.as_str()
            ));
        }
        if title.is_empty() {
            details.push("is missing title (<name>...</name>)");
        } else if title.to_lowercase() == name.to_lowercase() {
            details.push("has same title as name/artifactId");
        }
        if description.is_empty() {
            details.push("is missing description (<description>..</description>)");
        } else if description.split_whitespace().count() < MIN_DESCRIPTION_WORDS {
            details.push("has a too short description");
        }
        if organization.is_empty() {
            details.push("is missing organization (<organization><name>..</name></organization>)");
        }

        Ok(Verdict::from_bool(details.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn check(pom: &str) -> (Verdict, Vec<String>) {
        let mut details = Details::new();
        let verdict = PomDescription
            .validate(&RuleInput::new(Path::new("pom.xml"), pom.as_bytes()), None, &mut details)
            .unwrap();
        (verdict, details.iter().map(|d| d.message.clone()).collect())
    }

    #[test]
    fn test_complete_pom() {
        let (verdict, messages) = check(
            r#"<project xmlns="http://maven.apache.org/POM/4.0.0">
    <artifactId>shop-backend</artifactId>
    <name>Shop Backend</name>
    <description>Backend services for the shop</description>
    <organization><name>Example Org</name></organization>
</project>"#,
        );
        assert_eq!(verdict, Verdict::Pass, "{messages:?}");
    }

    #[test]
    fn test_incomplete_pom_lists_every_problem() {
        let (verdict, messages) = check(
            r#"<project>
    <artifactId>Shop_Backend</artifactId>
    <name>${project.artifactId}</name>
    <description>Too short</description>
</project>"#,
        );
        assert_eq!(verdict, Verdict::Fail);
        assert_eq!(
            messages,
            vec![
                "has invalid name (does not match ^[a-z][a-z0-9-]*$)".to_string(),
                "has same title as name/artifactId".to_string(),
                "has a too short description".to_string(),
                "is missing organization (<organization><name>..</name></organization>)".to_string(),
            ]
        );
    }

    #[test]
    fn test_unparseable_pom() {
        let (verdict, messages) = check("<project>");
        assert_eq!(verdict, Verdict::Fail);
        assert_eq!(messages.len(), 1);
    }
}
