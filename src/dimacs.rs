use std::fs;

use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{digit1, line_ending, multispace0, not_line_ending, space1};
use nom::combinator::{map_res, opt};
use nom::multi::many0;
use nom::sequence::{preceded, separated_pair, terminated};

use crate::error::InstanceError;
use crate::graph::{ConstraintGraph, NodeId};


/// reads a DIMACS file, returns its constraint graph
pub fn read_from_file(filename:&str) -> Result<ConstraintGraph, InstanceError> {
    let content = fs::read_to_string(filename)
        .map_err(|source| InstanceError::Io { path:filename.to_string(), source })?;
    let (n, edges) = parse_dimacs(&content)?;
    Ok(ConstraintGraph::from_edges(n, &edges, None)?)
}

/// parses a DIMACS document, returns (n, edges) with 0-based indices
pub fn parse_dimacs(content:&str) -> Result<(usize, Vec<(NodeId,NodeId)>), InstanceError> {
    let content = content.replace('\r', "");
    let s = skip_blanks_and_comments(&content);
    let (mut s, (n,m)) = read_header(s)
        .map_err(|_| InstanceError::Dimacs("missing `p edge n m` header".to_string()))?;
    let mut edges = Vec::new();
    loop {
        s = skip_blanks_and_comments(s);
        if s.is_empty() { break; }
        let (remaining, (a,b)) = read_edge(s)
            .map_err(|_| InstanceError::Dimacs(format!("unexpected line: {}", first_line(s))))?;
        // WARNING: indices start at 1 in the DIMACS format
        for x in [a,b].iter() {
            if *x == 0 || *x > n {
                return Err(InstanceError::Dimacs(format!("vertex {} out of range 1..={}", x, n)));
            }
        }
        edges.push((a-1, b-1));
        s = remaining;
    }
    if edges.len() != m && 2*edges.len() != m {
        return Err(InstanceError::Dimacs(format!(
            "header announces {} edges, found {}", m, edges.len()
        )));
    }
    Ok((n, edges))
}

fn first_line(s:&str) -> &str {
    s.lines().next().unwrap_or("")
}

fn skip_blanks_and_comments(s:&str) -> &str {
    let mut s = s;
    loop {
        let (after_blanks, _) = multispace0::<&str, nom::error::Error<&str>>(s)
            .unwrap_or((s, ""));
        match skip_comments(after_blanks) {
            Ok((remaining, comments)) if !comments.is_empty() => s = remaining,
            _ => return after_blanks,
        }
    }
}

/// skips a single comment line
fn skip_comment(s:&str) -> IResult<&str, &str> {
    terminated(preceded(tag("c"), not_line_ending), opt(line_ending))(s)
}

/// skips all comments
pub fn skip_comments(s:&str) -> IResult<&str, Vec<&str>> {
    many0(skip_comment)(s)
}

fn integer(s:&str) -> IResult<&str, usize> {
    map_res(digit1, |d:&str| d.parse::<usize>())(s)
}

/// reads two numbers separated by a space
fn read_two_integers(s:&str) -> IResult<&str, (usize,usize)> {
    terminated(separated_pair(integer, space1, integer), opt(line_ending))(s)
}

/// reads header containing (n,m)
pub fn read_header(s:&str) -> IResult<&str, (usize,usize)> {
    preceded(alt((tag("p edge "), tag("p col "))), read_two_integers)(s)
}

/// reads edge line
pub fn read_edge(s:&str) -> IResult<&str, (usize,usize)> {
    preceded(tag("e "), read_two_integers)(s)
}
