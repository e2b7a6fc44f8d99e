//! Naming-convention conversion for derived URL-path segments.

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

/// Convention applied to service and method identifiers when deriving default
/// URL paths. Anything other than the four known selectors is a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamingConvention {
    #[default]
    Noop,
    KebabCase,
    SnakeCase,
    LowerCamelCase,
    UpperCamelCase,
}

impl NamingConvention {
    /// Parse a selector string (`kebab-case`, `snake_case`, `lowerCamelCase`,
    /// `UpperCamelCase`); unknown selectors fall back to the no-op convention.
    pub fn from_selector(selector: &str) -> Self {
        match selector {
            "kebab-case" => NamingConvention::KebabCase,
            "snake_case" => NamingConvention::SnakeCase,
            "lowerCamelCase" => NamingConvention::LowerCamelCase,
            "UpperCamelCase" => NamingConvention::UpperCamelCase,
            _ => NamingConvention::Noop,
        }
    }

    /// Convert one identifier.
    pub fn convert(&self, name: &str) -> String {
        match self {
            NamingConvention::Noop => name.to_string(),
            NamingConvention::KebabCase => name.to_kebab_case(),
            NamingConvention::SnakeCase => name.to_snake_case(),
            NamingConvention::LowerCamelCase => name.to_lower_camel_case(),
            NamingConvention::UpperCamelCase => name.to_upper_camel_case(),
        }
    }
}
