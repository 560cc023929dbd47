use std::str::FromStr;

use anyhow::{anyhow, Result};
use miette::GraphicalReportHandler;
use nom::{
    character::complete::{char, digit1},
    combinator::{map, map_res, opt, recognize},
    error::ParseError,
    sequence::{separated_pair, tuple},
    IResult,
};
use nom_locate::LocatedSpan;
use nom_supreme::{
    error::{BaseErrorKind, ErrorTree, GenericErrorTree},
    final_parser::final_parser,
};

pub type Span<'a> = LocatedSpan<&'a str>;

#[derive(thiserror::Error, Debug, miette::Diagnostic)]
#[error("malformed line")]
struct BadLine<'a> {
    #[source_code]
    line: &'a str,

    #[label("{kind}")]
    at: miette::SourceSpan,

    kind: BaseErrorKind<&'a str, Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy)]
pub struct IdRange {
    start: i64,
    end: i64,
}

impl IdRange {
    pub fn contains(&self, id: i64) -> bool {
        self.start <= id && id <= self.end
    }
}

#[derive(Debug, Clone)]
pub struct Inventory {
    ranges: Vec<IdRange>,
    ids: Vec<i64>,
}

impl Inventory {
    pub fn num_ranges(&self) -> usize {
        self.ranges.len()
    }

    pub fn num_ids(&self) -> usize {
        self.ids.len()
    }

    pub fn num_fresh(&self) -> usize {
        self.ids
            .iter()
            .filter(|&&id| self.ranges.iter().any(|r| r.contains(id)))
            .count()
    }
}

fn parse_number<'a, E>(i: Span<'a>) -> IResult<Span<'a>, i64, E>
where
    E: ParseError<Span<'a>> + nom::error::FromExternalError<Span<'a>, std::num::ParseIntError>,
{
    map_res(recognize(tuple((opt(char('-')), digit1))), |i: Span<'a>| {
        FromStr::from_str(i.fragment())
    })(i)
}

fn parse_range<'a, E>(i: Span<'a>) -> IResult<Span<'a>, IdRange, E>
where
    E: ParseError<Span<'a>> + nom::error::FromExternalError<Span<'a>, std::num::ParseIntError>,
{
    map(
        separated_pair(parse_number, char('-'), parse_number),
        |(start, end)| IdRange { start, end },
    )(i)
}

fn parse_nice<'a, T, F>(l: &'a str, parse_fun: F) -> Option<T>
where
    F: FnMut(Span<'a>) -> IResult<Span<'a>, T, ErrorTree<Span<'a>>>,
{
    let line_span = Span::new(l);
    let line: Result<_, ErrorTree<Span>> = final_parser(parse_fun)(line_span);
    match line {
        Ok(line) => Some(line),
        Err(e) => {
            report_bad_line(l, e);
            None
        }
    }
}

fn report_bad_line<'a>(l: &'a str, tree: ErrorTree<Span<'a>>) {
    match tree {
        GenericErrorTree::Base { location, kind } => {
            let offset = location.location_offset().into();
            let err = BadLine {
                line: l,
                at: miette::SourceSpan::new(offset, 0.into()),
                kind,
            };
            let mut s = String::new();
            if GraphicalReportHandler::new()
                .render_report(&mut s, &err)
                .is_ok()
            {
                println!("{s}");
            }
        }
        GenericErrorTree::Stack { base, .. } => report_bad_line(l, *base),
        GenericErrorTree::Alt(alternatives) => {
            // report the alternative that got the furthest before failing
            if let Some(best) = alternatives.into_iter().max_by_key(progress) {
                report_bad_line(l, best);
            }
        }
    }
}

fn progress(tree: &ErrorTree<Span>) -> usize {
    match tree {
        GenericErrorTree::Base { location, .. } => location.location_offset(),
        GenericErrorTree::Stack { base, .. } => progress(base),
        GenericErrorTree::Alt(alternatives) => {
            alternatives.iter().map(progress).max().unwrap_or(0)
        }
    }
}

pub fn parse_inventory(input: impl Iterator<Item = String>) -> Result<Inventory> {
    let lines = input.collect::<Vec<_>>();

    // ranges before the first blank line, ids after it; later blank lines carry nothing
    let (range_lines, id_lines) = match lines.iter().position(|l| l.trim().is_empty()) {
        Some(blank) => (&lines[..blank], &lines[blank + 1..]),
        None => (&lines[..], &lines[lines.len()..]),
    };

    let ranges = range_lines
        .iter()
        .map(|l| {
            parse_nice(l.trim(), parse_range)
                .ok_or_else(|| anyhow!("couldn't parse range line {l:?}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let ids = id_lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| {
            parse_nice(l, parse_number).ok_or_else(|| anyhow!("couldn't parse id line {l:?}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Inventory { ranges, ids })
}

pub fn get_num_fresh(input: impl Iterator<Item = String>) -> Result<usize> {
    Ok(parse_inventory(input)?.num_fresh())
}
