use std::fmt::Display;

use clap::builder::{NonEmptyStringValueParser, TypedValueParser};
use clap::error::ErrorKind;

use nearby::utils::bytes_from_hex;

pub fn simple_error(err: impl Display) -> clap::Error {
    clap::Error::raw(ErrorKind::InvalidValue, format!("{}\n", err))
}

/// Raw bytes given on the command line as hex
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

#[derive(Clone)]
pub struct HexValueParser;

impl TypedValueParser for HexValueParser {
    type Value = HexBytes;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let parser = NonEmptyStringValueParser::new();
        let val = parser.parse_ref(cmd, arg, value)?;
        bytes_from_hex(&val).map(HexBytes).map_err(simple_error)
    }
}

#[cfg(test)]
mod test {
    use std::ffi::OsStr;

    use super::*;
    use rstest::*;

    #[rstest]
    #[case("0316F3FF", Some(vec![0x03, 0x16, 0xF3, 0xFF]))]
    #[case("03 16 f3 ff", Some(vec![0x03, 0x16, 0xF3, 0xFF]))]
    #[case("0x0316", Some(vec![0x03, 0x16]))]
    #[case("031", None)]
    #[case("", None)]
    fn test_hex_parser(#[case] raw: &str, #[case] expected: Option<Vec<u8>>) {
        let cmd = clap::Command::new("test");
        let res = HexValueParser.parse_ref(&cmd, None, OsStr::new(raw));
        assert_eq!(res.ok().map(|it| it.0), expected);
    }
}
