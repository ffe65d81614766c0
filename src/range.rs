use crate::error::{Error, Result};
use serde::Deserialize;

/// Pin-range shorthand as it appears in the input document: a single number,
/// a list of numbers, or a string of comma-separated tokens where each token
/// is one integer or an inclusive `start-end` range.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RangeSpec {
    Single(i64),
    Many(Vec<i64>),
    Shorthand(String),
}

/// Expands range shorthand into the explicit ordered pin sequence.
///
/// Ranges may descend: `"4-1"` yields `4, 3, 2, 1`.
pub fn expand(spec: &RangeSpec) -> Result<Vec<i64>> {
    match spec {
        RangeSpec::Single(number) => Ok(vec![*number]),
        RangeSpec::Many(numbers) => Ok(numbers.clone()),
        RangeSpec::Shorthand(text) => {
            let mut output = Vec::new();
            for token in text.split(',') {
                let token = token.trim();
                if let Some((start, end)) = token.split_once('-') {
                    let start = parse_bound(start, token)?;
                    let end = parse_bound(end, token)?;
                    if start <= end {
                        output.extend(start..=end);
                    } else {
                        output.extend((end..=start).rev());
                    }
                } else {
                    output.push(parse_bound(token, token)?);
                }
            }
            Ok(output)
        }
    }
}

fn parse_bound(text: &str, token: &str) -> Result<i64> {
    text.trim()
        .parse()
        .map_err(|_| Error::FormatError(format!("invalid token '{token}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_mixed_shorthand() {
        let pins = expand(&RangeSpec::Shorthand("1-3,5".to_string())).unwrap();
        assert_eq!(pins, vec![1, 2, 3, 5]);
    }

    #[test]
    fn descending_ranges_stay_descending() {
        let pins = expand(&RangeSpec::Shorthand("4-1".to_string())).unwrap();
        assert_eq!(pins, vec![4, 3, 2, 1]);
    }

    #[test]
    fn scalar_and_list_pass_through() {
        assert_eq!(expand(&RangeSpec::Single(7)).unwrap(), vec![7]);
        assert_eq!(
            expand(&RangeSpec::Many(vec![2, 4, 6])).unwrap(),
            vec![2, 4, 6]
        );
    }

    #[test]
    fn tolerates_whitespace_around_tokens() {
        let pins = expand(&RangeSpec::Shorthand(" 1 - 3 , 6".to_string())).unwrap();
        assert_eq!(pins, vec![1, 2, 3, 6]);
    }

    #[test]
    fn rejects_malformed_tokens() {
        for bad in ["1-", "-3", "a", "1-b", "", "1,,2"] {
            let result = expand(&RangeSpec::Shorthand(bad.to_string()));
            assert!(
                matches!(result, Err(Error::FormatError(_))),
                "expected FormatError for {bad:?}, got {result:?}"
            );
        }
    }
}
