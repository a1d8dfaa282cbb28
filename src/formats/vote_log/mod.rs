//! Plain-text vote logs: one `<voter_id> <candidate_number> <center_id>`
//! triple per line, separated by whitespace or commas. `#` starts a comment.

use super::{FormatError, FormatResult};
use crate::model::registry::VoteEvent;
use nom::{
    branch::alt,
    character::complete::{char, i64 as integer, space0, space1},
    combinator::{all_consuming, map, value},
    sequence::{delimited, preceded, tuple},
    IResult,
};

fn separator(input: &str) -> IResult<&str, ()> {
    alt((value((), delimited(space0, char(','), space0)), value((), space1)))(input)
}

fn vote_line(input: &str) -> IResult<&str, VoteEvent> {
    map(
        tuple((integer, preceded(separator, integer), preceded(separator, integer))),
        |(voter_id, candidate_number, center_id)| VoteEvent {
            voter_id,
            candidate_number,
            center_id,
        },
    )(input)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(start) => &line[..start],
        None => line,
    }
}

/// Parse a whole vote log. Fails on the first malformed line, reporting its
/// 1-based line number.
pub fn parse_vote_log(text: &str) -> FormatResult<Vec<VoteEvent>> {
    let mut votes = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let content = strip_comment(line).trim();
        if content.is_empty() {
            continue;
        }
        match all_consuming(vote_line)(content) {
            Ok((_, vote)) => votes.push(vote),
            Err(_) => {
                return Err(FormatError::VoteLog {
                    line: number + 1,
                    message: format!(
                        "expected `voter_id candidate_number center_id`, found '{}'",
                        content
                    ),
                })
            }
        }
    }
    Ok(votes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(voter_id: i64, candidate_number: i64, center_id: i64) -> VoteEvent {
        VoteEvent {
            voter_id,
            candidate_number,
            center_id,
        }
    }

    #[test]
    fn accepts_spaces_commas_and_comments() {
        let text = "# replay of booth 10\n\
                    1 1 10\n\
                    \n\
                    2,1,10\n\
                    3 , 2 ,10   # late ballot\n\
                    \t4\t3\t11\r\n";
        let votes = parse_vote_log(text).unwrap();
        assert_eq!(
            votes,
            vec![vote(1, 1, 10), vote(2, 1, 10), vote(3, 2, 10), vote(4, 3, 11)]
        );
    }

    #[test]
    fn empty_log_has_no_votes() {
        assert!(parse_vote_log("").unwrap().is_empty());
        assert!(parse_vote_log("# nothing\n\n   \n").unwrap().is_empty());
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let text = "1 1 10\n2 1\n3 2 10\n";
        match parse_vote_log(text).unwrap_err() {
            FormatError::VoteLog { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("'2 1'"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let err = parse_vote_log("1 1 10 extra\n").unwrap_err();
        assert!(matches!(err, FormatError::VoteLog { line: 1, .. }));
        let err = parse_vote_log("1 1 ten\n").unwrap_err();
        assert!(matches!(err, FormatError::VoteLog { line: 1, .. }));
    }
}
