//! Range expression parser.
//!
//! Desugars the node-semver grammar into intervals:
//! - `||` separates alternatives, each a comparator set
//! - comparators within a set are separated by whitespace and intersected
//! - `A - B` hyphen ranges, `~` tilde ranges, `^` caret ranges
//! - X-ranges: `1`, `1.2`, `1.x`, `*`
//! - whitespace between an operator and its version is allowed (`>= 1.2`)

use super::interval::{Bound, Interval};
use super::version::{Partial, Version};
use super::RangeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Tilde,
    Caret,
}

// Longest operators first so `>=` is not read as `>`
const OPERATORS: &[(&str, Op)] = &[
    (">=", Op::Gte),
    ("<=", Op::Lte),
    ("~>", Op::Tilde),
    (">", Op::Gt),
    ("<", Op::Lt),
    ("=", Op::Eq),
    ("~", Op::Tilde),
    ("^", Op::Caret),
];

/// Parse a full range expression into its union of intervals.
pub(crate) fn parse_range(input: &str) -> Result<Vec<Interval>, RangeError> {
    input
        .split("||")
        .map(|set| parse_comparator_set(set).map_err(|reason| RangeError::invalid(input, reason)))
        .collect()
}

fn parse_comparator_set(set: &str) -> Result<Interval, String> {
    let words: Vec<&str> = set.split_whitespace().collect();
    if words.is_empty() {
        return Ok(Interval::full());
    }

    if let Some(pos) = words.iter().position(|w| *w == "-") {
        if pos != 1 || words.len() != 3 {
            return Err(format!("malformed hyphen range '{}'", set.trim()));
        }
        return hyphen(partial(words[0])?, partial(words[2])?);
    }

    let mut interval = Interval::full();
    for comparator in join_operators(&words)? {
        interval = interval.intersect(&parse_comparator(&comparator)?);
    }
    Ok(interval)
}

/// Glue a detached operator onto the version that follows it.
fn join_operators(words: &[&str]) -> Result<Vec<String>, String> {
    let mut comparators = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        let word = words[i];
        if OPERATORS.iter().any(|(text, _)| *text == word) {
            let next = words
                .get(i + 1)
                .ok_or_else(|| format!("operator '{}' has no version", word))?;
            comparators.push(format!("{}{}", word, next));
            i += 2;
        } else {
            comparators.push(word.to_string());
            i += 1;
        }
    }
    Ok(comparators)
}

fn split_operator(text: &str) -> (Op, &str) {
    OPERATORS
        .iter()
        .find_map(|(prefix, op)| text.strip_prefix(prefix).map(|rest| (*op, rest)))
        .unwrap_or((Op::Eq, text))
}

fn partial(text: &str) -> Result<Partial, String> {
    Partial::parse(text).map_err(|e| e.to_string())
}

fn parse_comparator(text: &str) -> Result<Interval, String> {
    let (op, rest) = split_operator(text);
    let p = partial(rest)?;

    let (floor, ceiling) = match p.floor() {
        Some(floor) => (floor, p.ceiling()),
        None => {
            // Bare wildcard: `>*` and `<*` admit nothing, everything else admits all
            return Ok(match op {
                Op::Gt | Op::Lt => Interval::empty(),
                _ => Interval::full(),
            });
        }
    };

    Ok(match op {
        Op::Eq => match ceiling {
            Some(ceiling) => Interval::between(floor, ceiling),
            None => Interval::exactly(floor),
        },
        Op::Gte => Interval::at_least(floor),
        Op::Gt => match ceiling {
            Some(ceiling) => Interval::at_least(ceiling),
            None => Interval::greater_than(floor),
        },
        Op::Lt => Interval::below(floor),
        Op::Lte => match ceiling {
            Some(ceiling) => Interval::below(ceiling),
            None => Interval::at_most(floor),
        },
        Op::Tilde => {
            let upper = match p.minor {
                Some(minor) => Version::new(floor.major, minor.saturating_add(1), 0),
                None => Version::new(floor.major.saturating_add(1), 0, 0),
            };
            Interval::between(floor, upper)
        }
        Op::Caret => {
            let upper = caret_upper(&p, &floor);
            Interval::between(floor, upper)
        }
    })
}

/// Caret ranges allow changes that do not modify the left-most non-zero
/// component.
fn caret_upper(p: &Partial, floor: &Version) -> Version {
    match (floor.major, p.minor, p.patch) {
        (major, _, _) if major > 0 => Version::new(major.saturating_add(1), 0, 0),
        (_, None, _) => Version::new(1, 0, 0),
        (_, Some(minor), _) if minor > 0 => Version::new(0, minor.saturating_add(1), 0),
        (_, Some(_), None) => Version::new(0, 1, 0),
        (_, Some(_), Some(patch)) => Version::new(0, 0, patch.saturating_add(1)),
    }
}

fn hyphen(from: Partial, to: Partial) -> Result<Interval, String> {
    let lower = match from.floor() {
        Some(v) => Bound::Included(v),
        None => Bound::Unbounded,
    };
    let upper = match (to.floor(), to.ceiling()) {
        (None, _) => Bound::Unbounded,
        (Some(_), Some(ceiling)) => Bound::Excluded(ceiling),
        (Some(floor), None) => Bound::Included(floor),
    };
    Ok(Interval { lower, upper })
}
