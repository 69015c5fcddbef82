use crate::parser::{ParseError, QueryParser};

/// Index of a positional parameter in the parameter vector of the statement it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamRef {
    pub index: usize,
}

/// One positional marker: left-to-right index, char span in the text it was
/// found in, and the named parameter it was renumbered to, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderOccurrence {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub name: Option<String>,
}

impl PlaceholderOccurrence {
    pub fn param(&self) -> ParamRef {
        ParamRef { index: self.index }
    }

    pub fn within(&self, start: usize, end: usize) -> bool {
        self.start >= start && self.end <= end
    }
}

pub struct PlaceholderLocator;

impl PlaceholderLocator {
    /// Every `?` outside literals, quoted identifiers and comments.
    pub fn locate(text: &str) -> Result<Vec<PlaceholderOccurrence>, ParseError> {
        let mut parser = QueryParser::new(text);
        Self::locate_with(&mut parser)
    }

    pub fn locate_with(parser: &mut QueryParser) -> Result<Vec<PlaceholderOccurrence>, ParseError> {
        let mut occurrences = vec![];
        parser.position = 0;

        while !parser.eof() {
            if parser.skip_quoted()? {
                continue;
            }
            if parser.is_placeholder() {
                occurrences.push(PlaceholderOccurrence {
                    index: occurrences.len(),
                    start: parser.position,
                    end: parser.position + 1,
                    name: None,
                });
            }
            parser.next();
        }

        Ok(occurrences)
    }

    pub fn count(text: &str) -> Result<usize, ParseError> {
        Self::locate(text).map(|occurrences| occurrences.len())
    }

    /// Number of placeholders located strictly before `position`.
    pub fn count_before(occurrences: &[PlaceholderOccurrence], position: usize) -> usize {
        occurrences.iter().take_while(|occurrence| occurrence.start < position).count()
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ParamRef, PlaceholderLocator};

    #[test]
    pub fn test_locate() {
        let text = "SELECT * FROM t WHERE a = ? AND b IN (?, ?)";

        let occurrences = PlaceholderLocator::locate(text).expect("Failed to locate placeholders");

        assert_eq!(occurrences.len(), 3);
        assert_eq!(occurrences[0].start, 26);
        assert_eq!(occurrences[1].start, 38);
        assert_eq!(occurrences[2].param(), ParamRef { index: 2 });
    }

    #[test]
    pub fn test_locate_ignores_literals_and_comments() {
        let text = "SELECT '?', `a?`, \"?\" FROM t -- ?\nWHERE x = ? /* ? */";

        let occurrences = PlaceholderLocator::locate(text).expect("Failed to locate placeholders");

        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].index, 0);
    }

    #[test]
    pub fn test_locate_none() {
        assert_eq!(PlaceholderLocator::count("SELECT 1").expect("Failed to count"), 0);
    }

    #[test]
    pub fn test_count_before() {
        let occurrences = PlaceholderLocator::locate("a = ? AND b = ? LIMIT ?").expect("Failed to locate placeholders");

        assert_eq!(PlaceholderLocator::count_before(&occurrences, 16), 2);
        assert_eq!(PlaceholderLocator::count_before(&occurrences, 4), 0);
    }

    #[test]
    pub fn test_locate_unterminated_literal() {
        assert!(PlaceholderLocator::locate("WHERE a = '?").is_err());
    }
}
