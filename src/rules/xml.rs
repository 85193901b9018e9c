//! Markup rules: xml (well-formedness) and xmlfmt (canonical pretty printing).

use crate::markup::{self, Document};
use crate::rule::{Details, FixCapability, Rule, RuleError, RuleInput, RuleOptions, ValidationResult, Verdict};

/// Inputs shorter than this are considered formatted and never rewritten
const MIN_FORMAT_LEN: usize = 4;

/// Rule xml: content must parse as XML
///
/// The declared encoding is honored for UTF-8, ISO-8859-1 and US-ASCII; any other
/// declared encoding is reported as a failure.
#[derive(Debug, Clone, Default)]
pub struct XmlWellFormed;

impl Rule for XmlWellFormed {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn message(&self) -> &'static str {
        "is not valid XML"
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        _options: Option<&RuleOptions>,
        details: &mut Details,
    ) -> ValidationResult {
        match Document::parse(input.content) {
            Ok(_) => Ok(Verdict::Pass),
            Err(e) => {
                details.push(e.to_string());
                Ok(Verdict::Fail)
            }
        }
    }
}

/// Rule xmlfmt: content must already be pretty-printed
///
/// Validation formats a copy and compares bytes, so the check and the fix can never disagree.
#[derive(Debug, Clone, Default)]
pub struct XmlFormat;

impl Rule for XmlFormat {
    fn name(&self) -> &'static str {
        "xmlfmt"
    }

    fn message(&self) -> &'static str {
        "is not well-formatted (pretty-printed) XML"
    }

    fn fix_capability(&self) -> FixCapability {
        FixCapability::Fixable
    }

    fn validate(
        &self,
        input: &RuleInput<'_>,
        _options: Option<&RuleOptions>,
        _details: &mut Details,
    ) -> ValidationResult {
        if input.content.len() < MIN_FORMAT_LEN {
            return Ok(Verdict::Pass);
        }
        let formatted = markup::is_pretty_printed(input.content).map_err(|e| RuleError::Parse(e.to_string()))?;
        Ok(Verdict::from_bool(formatted))
    }

    fn fix(&self, source: &[u8], destination: &mut Vec<u8>, _options: Option<&RuleOptions>) -> Result<(), RuleError> {
        if source.len() < MIN_FORMAT_LEN {
            destination.extend_from_slice(source);
            return Ok(());
        }
        let formatted = markup::pretty_print(source).map_err(|e| RuleError::Parse(e.to_string()))?;
        destination.extend_from_slice(&formatted);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn validate(rule: &dyn Rule, content: &[u8]) -> (ValidationResult, Details) {
        let mut details = Details::new();
        let result = rule.validate(&RuleInput::new(Path::new("a.xml"), content), None, &mut details);
        (result, details)
    }

    #[test]
    fn test_well_formed() {
        assert_eq!(validate(&XmlWellFormed, b"<a><b/></a>").0.unwrap(), Verdict::Pass);
    }

    #[test]
    fn test_malformed_produces_detail() {
        let (result, details) = validate(&XmlWellFormed, b"<a><b></a>");
        assert_eq!(result.unwrap(), Verdict::Fail);
        assert_eq!(details.len(), 1);
        assert!(details.iter().next().unwrap().message.contains("XMLSyntaxError"));
    }

    #[test]
    fn test_tiny_input_is_formatted() {
        assert_eq!(validate(&XmlFormat, b"").0.unwrap(), Verdict::Pass);
        assert_eq!(validate(&XmlFormat, b"<a>").0.unwrap(), Verdict::Pass);

        let mut out = Vec::new();
        XmlFormat.fix(b"<a>", &mut out, None).unwrap();
        assert_eq!(out, b"<a>");
    }

    #[test]
    fn test_format_roundtrip() {
        let (result, _) = validate(&XmlFormat, b"<a><b/></a>");
        assert_eq!(result.unwrap(), Verdict::Fail);

        let mut out = Vec::new();
        XmlFormat.fix(b"<a><b/></a>", &mut out, None).unwrap();
        assert_eq!(out, b"<?xml version='1.0' encoding='utf-8'?>\n<a>\n    <b/>\n</a>\n");

        let (result, _) = validate(&XmlFormat, &out);
        assert_eq!(result.unwrap(), Verdict::Pass);
    }

    #[test]
    fn test_documents_with_entity_references_are_never_rewritten() {
        let content = b"<!DOCTYPE a [<!ENTITY e \"v\">]>\n<a><b>&e;</b></a>";
        assert_eq!(validate(&XmlWellFormed, content).0.unwrap(), Verdict::Pass);

        let (result, _) = validate(&XmlFormat, content);
        assert!(matches!(result, Err(RuleError::Parse(m)) if m.contains("&e;")));

        let mut out = Vec::new();
        assert!(XmlFormat.fix(content, &mut out, None).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_latin1_document_is_well_formed() {
        let content = b"<?xml version='1.0' encoding='ISO-8859-1'?>\n<a>\xe9t\xe9</a>";
        assert_eq!(validate(&XmlWellFormed, content).0.unwrap(), Verdict::Pass);
    }

    #[test]
    fn test_unparseable_input_is_an_error() {
        let (result, _) = validate(&XmlFormat, b"not xml at all");
        assert!(matches!(result, Err(RuleError::Parse(_))));
    }
}
