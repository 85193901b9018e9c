mod database_dir;
mod encoding;
pub mod external;
mod indent4;
mod invalid_path;
mod json;
mod no_bom;
mod no_cr;
mod no_tabs;
mod no_trailing_ws;
mod pom_description;
mod sql_diff;
mod xml;

pub use database_dir::DatabaseDir;
pub use encoding::{AsciiEncoding, Utf8Encoding};
pub use external::{Coffeelint, Jalopy, Pep8, Phpcs, PuppetParser, Pyflakes, PythonTidy};
pub use indent4::Indent4;
pub use invalid_path::InvalidPath;
pub use json::JsonValid;
pub use no_bom::NoBom;
pub use no_cr::NoCarriageReturn;
pub use no_tabs::NoTabs;
pub use no_trailing_ws::NoTrailingWhitespace;
pub use pom_description::PomDescription;
pub use sql_diff::{SqlDiffDir, SqlDiffSql};
pub use xml::{XmlFormat, XmlWellFormed};

use crate::rule::Rule;

/// Every built-in rule, in catalog order
pub fn all_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(Utf8Encoding),
        Box::new(AsciiEncoding),
        Box::new(NoBom),
        Box::new(NoTabs),
        Box::new(NoCarriageReturn),
        Box::new(InvalidPath),
        Box::new(Indent4),
        Box::new(NoTrailingWhitespace),
        Box::new(XmlWellFormed),
        Box::new(XmlFormat),
        Box::new(JsonValid),
        Box::new(PomDescription),
        Box::new(SqlDiffDir),
        Box::new(SqlDiffSql),
        Box::new(DatabaseDir),
        Box::new(Phpcs),
        Box::new(Coffeelint),
        Box::new(PuppetParser),
        Box::new(Jalopy),
        Box::new(PythonTidy),
        Box::new(Pep8),
        Box::new(Pyflakes),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rule_names_are_unique() {
        let rules = all_rules();
        let names: HashSet<&str> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(names.len(), rules.len());
    }

    #[test]
    fn test_fixable_rules() {
        use crate::rule::FixCapability;
        let fixable: Vec<&str> = all_rules()
            .iter()
            .filter(|r| r.fix_capability() == FixCapability::Fixable)
            .map(|r| r.name())
            .collect();
        assert_eq!(
            fixable,
            vec!["nobom", "notabs", "nocr", "notrailingws", "xmlfmt", "jalopy", "pythontidy", "pep8"]
        );
    }
}
