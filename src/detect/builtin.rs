//! Built-in token pattern detector
//!
//! Maps short token sequences to the Node.js release that first shipped
//! the feature without a flag. Versions follow node.green.

use super::lexer::{tokenize, Spanned, Token};
use super::{DetectError, DetectedFeature, FeatureDetector};

/// Token kinds a rule can ask for by shape alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Punct {
    FatArrow,
    Ellipsis,
    OptionalChain,
    Nullish,
    NullishAssign,
    OrAssign,
    AndAssign,
    Exponent,
    ExponentAssign,
    Star,
    Dot,
    LeftParen,
    LeftBrace,
    Template,
}

impl Punct {
    fn of(token: &Token) -> Option<Punct> {
        Some(match token {
            Token::FatArrow => Punct::FatArrow,
            Token::Ellipsis => Punct::Ellipsis,
            Token::OptionalChain => Punct::OptionalChain,
            Token::Nullish => Punct::Nullish,
            Token::NullishAssign => Punct::NullishAssign,
            Token::OrAssign => Punct::OrAssign,
            Token::AndAssign => Punct::AndAssign,
            Token::Exponent => Punct::Exponent,
            Token::ExponentAssign => Punct::ExponentAssign,
            Token::Star => Punct::Star,
            Token::Dot => Punct::Dot,
            Token::LeftParen => Punct::LeftParen,
            Token::LeftBrace => Punct::LeftBrace,
            Token::Template => Punct::Template,
            _ => return None,
        })
    }
}

/// Matches a single token.
#[derive(Clone, Copy)]
enum Matcher {
    Is(Punct),
    Ident(&'static str),
    AnyIdent,
    AnyPrivateName,
    NumberWhere(fn(&str) -> bool),
}

impl Matcher {
    fn matches(&self, token: &Token) -> bool {
        match (self, token) {
            (Matcher::Is(expected), actual) => Punct::of(actual) == Some(*expected),
            (Matcher::Ident(name), Token::Identifier(actual)) => name == actual,
            (Matcher::AnyIdent, Token::Identifier(_)) => true,
            (Matcher::AnyPrivateName, Token::PrivateName(_)) => true,
            (Matcher::NumberWhere(pred), Token::Number(text)) => pred(text),
            _ => false,
        }
    }
}

/// A feature, the Node.js version it needs, and the tokens that reveal it.
pub struct FeatureRule {
    pub name: &'static str,
    pub required_version: &'static str,
    pattern: &'static [Matcher],
}

impl std::fmt::Debug for FeatureRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureRule")
            .field("name", &self.name)
            .field("required_version", &self.required_version)
            .field("tokens", &self.pattern.len())
            .finish()
    }
}

use Matcher::{AnyIdent, AnyPrivateName, Ident, Is, NumberWhere};

fn is_bigint(text: &str) -> bool {
    text.ends_with('n')
}

fn has_separator(text: &str) -> bool {
    text.contains('_')
}

#[rustfmt::skip]
static RULES: &[FeatureRule] = &[
    // ES2015
    FeatureRule { name: "arrow functions", required_version: "4.0.0", pattern: &[Is(Punct::FatArrow)] },
    FeatureRule { name: "template literals", required_version: "4.0.0", pattern: &[Is(Punct::Template)] },
    FeatureRule { name: "generators", required_version: "4.0.0", pattern: &[Ident("function"), Is(Punct::Star)] },
    FeatureRule { name: "spread and rest syntax", required_version: "5.0.0", pattern: &[Is(Punct::Ellipsis)] },
    FeatureRule { name: "classes", required_version: "6.0.0", pattern: &[Ident("class")] },
    FeatureRule { name: "let declarations", required_version: "6.0.0", pattern: &[Ident("let")] },
    FeatureRule { name: "const declarations", required_version: "6.0.0", pattern: &[Ident("const")] },
    // ES2016-ES2017
    FeatureRule { name: "exponentiation operator", required_version: "7.0.0", pattern: &[Is(Punct::Exponent)] },
    FeatureRule { name: "exponentiation operator", required_version: "7.0.0", pattern: &[Is(Punct::ExponentAssign)] },
    FeatureRule { name: "Object.entries", required_version: "7.0.0", pattern: &[Ident("Object"), Is(Punct::Dot), Ident("entries")] },
    FeatureRule { name: "Object.values", required_version: "7.0.0", pattern: &[Ident("Object"), Is(Punct::Dot), Ident("values")] },
    FeatureRule { name: "async functions", required_version: "7.6.0", pattern: &[Ident("async"), Ident("function")] },
    FeatureRule { name: "async functions", required_version: "7.6.0", pattern: &[Ident("async"), Is(Punct::LeftParen)] },
    FeatureRule { name: "async functions", required_version: "7.6.0", pattern: &[Ident("async"), AnyIdent, Is(Punct::FatArrow)] },
    FeatureRule { name: "String.prototype.padStart", required_version: "8.0.0", pattern: &[Is(Punct::Dot), Ident("padStart"), Is(Punct::LeftParen)] },
    FeatureRule { name: "String.prototype.padEnd", required_version: "8.0.0", pattern: &[Is(Punct::Dot), Ident("padEnd"), Is(Punct::LeftParen)] },
    // ES2018-ES2019
    FeatureRule { name: "async iteration", required_version: "10.0.0", pattern: &[Ident("for"), Ident("await")] },
    FeatureRule { name: "optional catch binding", required_version: "10.0.0", pattern: &[Ident("catch"), Is(Punct::LeftBrace)] },
    FeatureRule { name: "BigInt literals", required_version: "10.4.0", pattern: &[NumberWhere(is_bigint)] },
    FeatureRule { name: "Array.prototype.flat", required_version: "11.0.0", pattern: &[Is(Punct::Dot), Ident("flat"), Is(Punct::LeftParen)] },
    FeatureRule { name: "Array.prototype.flatMap", required_version: "11.0.0", pattern: &[Is(Punct::Dot), Ident("flatMap"), Is(Punct::LeftParen)] },
    FeatureRule { name: "Object.fromEntries", required_version: "12.0.0", pattern: &[Ident("Object"), Is(Punct::Dot), Ident("fromEntries")] },
    FeatureRule { name: "globalThis", required_version: "12.0.0", pattern: &[Ident("globalThis")] },
    FeatureRule { name: "private class members", required_version: "12.0.0", pattern: &[AnyPrivateName] },
    // ES2020-ES2021
    FeatureRule { name: "numeric separators", required_version: "12.5.0", pattern: &[NumberWhere(has_separator)] },
    FeatureRule { name: "Promise.allSettled", required_version: "12.9.0", pattern: &[Ident("Promise"), Is(Punct::Dot), Ident("allSettled")] },
    FeatureRule { name: "optional chaining", required_version: "14.0.0", pattern: &[Is(Punct::OptionalChain)] },
    FeatureRule { name: "nullish coalescing", required_version: "14.0.0", pattern: &[Is(Punct::Nullish)] },
    FeatureRule { name: "logical assignment", required_version: "15.0.0", pattern: &[Is(Punct::NullishAssign)] },
    FeatureRule { name: "logical assignment", required_version: "15.0.0", pattern: &[Is(Punct::OrAssign)] },
    FeatureRule { name: "logical assignment", required_version: "15.0.0", pattern: &[Is(Punct::AndAssign)] },
    FeatureRule { name: "String.prototype.replaceAll", required_version: "15.0.0", pattern: &[Is(Punct::Dot), Ident("replaceAll"), Is(Punct::LeftParen)] },
    FeatureRule { name: "Promise.any", required_version: "15.0.0", pattern: &[Ident("Promise"), Is(Punct::Dot), Ident("any")] },
    // ES2022+
    FeatureRule { name: "Array.prototype.at", required_version: "16.6.0", pattern: &[Is(Punct::Dot), Ident("at"), Is(Punct::LeftParen)] },
    FeatureRule { name: "Object.hasOwn", required_version: "16.9.0", pattern: &[Ident("Object"), Is(Punct::Dot), Ident("hasOwn")] },
    FeatureRule { name: "class static blocks", required_version: "16.11.0", pattern: &[Ident("static"), Is(Punct::LeftBrace)] },
    FeatureRule { name: "structuredClone", required_version: "17.0.0", pattern: &[Ident("structuredClone")] },
    FeatureRule { name: "Array.prototype.findLast", required_version: "18.0.0", pattern: &[Is(Punct::Dot), Ident("findLast"), Is(Punct::LeftParen)] },
];

/// Detector backed by the static rule table above.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinDetector;

impl BuiltinDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn rules() -> &'static [FeatureRule] {
        RULES
    }

    fn scan(&self, tokens: &[Spanned]) -> Vec<DetectedFeature> {
        let mut found = Vec::new();
        for start in 0..tokens.len() {
            for rule in RULES {
                let window = match tokens.get(start..start + rule.pattern.len()) {
                    Some(window) => window,
                    None => continue,
                };
                let hit = rule
                    .pattern
                    .iter()
                    .zip(window)
                    .all(|(matcher, spanned)| matcher.matches(&spanned.token));
                if hit {
                    found.push(DetectedFeature {
                        name: rule.name.to_string(),
                        required_version: rule.required_version.to_string(),
                        line: Some(tokens[start].line),
                    });
                }
            }
        }
        found
    }
}

impl FeatureDetector for BuiltinDetector {
    fn name(&self) -> &str {
        "builtin"
    }

    fn detect(&self, source: &str) -> Result<Vec<DetectedFeature>, DetectError> {
        Ok(self.scan(&tokenize(source)))
    }
}
