use nom::character::complete::{char, digit1};
use nom::combinator::{map_res, opt, recognize};
use nom::sequence::pair;

use crate::parser::PResult;

/// Parse a signed integer: an optional leading `-` and one or more digits
pub(crate) fn parse_int(input: &str) -> PResult<isize> {
    map_res(recognize(pair(opt(char('-')), digit1)), |text: &str| {
        text.parse::<isize>()
    })(input)
}
