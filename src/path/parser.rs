use thiserror::Error;

use crate::pattern::ByteClass;
use crate::sanitize::{cleanup_field_name, lossy_text, trim_captured_symbol};

use super::types::{CaptureDest, PartKind, PathPart, UrlPath};

/// Syntax error inside a `{...}` capture part.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapturePartError {
    #[error("empty capture part")]
    EmptyCapture,
    #[error("capture part not closed")]
    NotClosed,
    #[error("invalid capture part: parenthesis not match")]
    ParenthesisMismatch,
    #[error("invalid capture part: cannot have setter function name")]
    MissingSetterName,
    #[error("invalid capture part: cannot have setter function argument 0 for type")]
    MissingSetterArg0,
    #[error("invalid capture part: cannot have setter function argument: `{0}`")]
    MissingSetterArg(String),
    #[error("invalid capture part: empty setter function argument: `{0}`")]
    EmptySetterArg(String),
    #[error("empty capture pattern: [{0}]")]
    EmptyPattern(String),
    #[error("invalid capture part: cannot have field name or handler parameter")]
    MissingTarget,
    #[error("invalid capture part: empty handler parameter name")]
    EmptyHandlerParamName,
    #[error("invalid capture part: empty handler parameter type")]
    EmptyHandlerParamType,
    #[error("invalid capture part: empty field name")]
    EmptyFieldName,
}

/// Capture syntax error located at a byte index of the stripped raw path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("parse failed around index {index}: {kind}")]
pub struct PathParseError {
    pub index: usize,
    pub kind: CapturePartError,
}

impl UrlPath {
    /// Parse an annotated URL path into its part list.
    ///
    /// Leading `/` runs are stripped before parsing; an input that is empty
    /// afterwards yields a path with no parts. Fixed-segment escapes are
    /// decoded; capture parts are split into name, pattern, and destination
    /// per the grammar in the [module docs](crate::path).
    pub fn parse(path: &str) -> Result<UrlPath, PathParseError> {
        let mut raw: &[u8] = path.as_bytes();
        while let Some((&b'/', rest)) = raw.split_first() {
            raw = rest;
        }
        let mut result = UrlPath {
            raw_path: raw.to_vec(),
            parts: Vec::new(),
        };
        let mut state = PartParser::fixed_at(0);
        for idx in 0..result.raw_path.len() {
            let ch = result.raw_path[idx];
            state = state
                .feed(&mut result, idx, ch)
                .map_err(|kind| PathParseError { index: idx, kind })?;
        }
        let end = result.raw_path.len();
        state
            .finish(&mut result)
            .map_err(|kind| PathParseError { index: end, kind })?;
        Ok(result)
    }
}

/// Streaming parser state: each variant carries only its working indices and
/// a one-shot escape flag.
enum PartParser {
    Fixed(FixedScan),
    Capture(CaptureScan),
}

impl PartParser {
    fn fixed_at(start: usize) -> Self {
        PartParser::Fixed(FixedScan {
            start,
            buf: Vec::new(),
            escaped: false,
        })
    }

    fn feed(
        self,
        result: &mut UrlPath,
        idx: usize,
        ch: u8,
    ) -> Result<PartParser, CapturePartError> {
        match self {
            PartParser::Fixed(scan) => scan.feed(result, idx, ch),
            PartParser::Capture(scan) => scan.feed(result, idx, ch),
        }
    }

    fn finish(self, result: &mut UrlPath) -> Result<(), CapturePartError> {
        match self {
            PartParser::Fixed(mut scan) => {
                let end = result.raw_path.len();
                scan.seal(result, end);
                Ok(())
            }
            PartParser::Capture(_) => Err(CapturePartError::NotClosed),
        }
    }
}

struct FixedScan {
    start: usize,
    buf: Vec<u8>,
    escaped: bool,
}

impl FixedScan {
    fn feed(
        mut self,
        result: &mut UrlPath,
        idx: usize,
        ch: u8,
    ) -> Result<PartParser, CapturePartError> {
        if self.escaped {
            self.escaped = false;
            self.buf.push(ch);
            return Ok(PartParser::Fixed(self));
        }
        if ch == b'\\' {
            self.escaped = true;
            return Ok(PartParser::Fixed(self));
        }
        if ch == b'{' {
            self.seal(result, idx);
            return Ok(PartParser::Capture(CaptureScan {
                start: idx,
                first_colon: None,
                escaped: false,
            }));
        }
        self.buf.push(ch);
        Ok(PartParser::Fixed(self))
    }

    /// Flush buffered literal bytes as a Fixed part; `end` is exclusive.
    fn seal(&mut self, result: &mut UrlPath, end: usize) {
        if self.buf.is_empty() {
            return;
        }
        let raw = result.raw_path[self.start..end].to_vec();
        result.parts.push(PathPart {
            raw,
            kind: PartKind::Fixed {
                bytes: std::mem::take(&mut self.buf),
            },
        });
    }
}

struct CaptureScan {
    start: usize,
    first_colon: Option<usize>,
    escaped: bool,
}

/// Destination region scanned out of a closed capture.
enum Target {
    Field(String),
    Handler { name: String, type_name: String },
    Setter {
        func_name: String,
        arg0_type: String,
        extra_args: Vec<String>,
    },
}

impl CaptureScan {
    fn feed(
        mut self,
        result: &mut UrlPath,
        idx: usize,
        ch: u8,
    ) -> Result<PartParser, CapturePartError> {
        if self.escaped {
            self.escaped = false;
            return Ok(PartParser::Capture(self));
        }
        if ch == b'\\' {
            self.escaped = true;
            return Ok(PartParser::Capture(self));
        }
        if ch == b':' && self.first_colon.is_none() {
            self.first_colon = Some(idx);
            return Ok(PartParser::Capture(self));
        }
        if ch == b'}' {
            self.close(result, idx)?;
            return Ok(PartParser::fixed_at(idx + 1));
        }
        Ok(PartParser::Capture(self))
    }

    /// Parse the closed capture `{...}` region; `end` is the `}` index.
    ///
    /// Works backwards from the closing brace: first the target (setter call,
    /// handler parameter, or field name), then an optional pattern delimited
    /// by the comma the target scan stopped on, then an optional capture name
    /// before the first colon.
    fn close(&self, result: &mut UrlPath, end: usize) -> Result<(), CapturePartError> {
        let start = self.start;
        let part = {
            let raw = result.raw_path.as_slice();
            let mut idx = end - 1;
            while raw[idx] == b' ' || raw[idx] == b'\t' {
                idx -= 1;
                if idx <= start {
                    return Err(CapturePartError::EmptyCapture);
                }
            }

            let target;
            if raw[idx] == b')' {
                let (t, next) = parse_setter(raw, start, idx)?;
                target = t;
                idx = next;
            } else {
                let (t, next) = parse_field_or_handler(raw, start, idx)?;
                target = t;
                idx = next;
            }

            let mut pattern = ByteClass::new();
            if raw[idx] == b',' {
                let comma = idx;
                let mut pattern_start = self.first_colon.map(|c| c + 1).unwrap_or(start + 1);
                while pattern_start < comma && raw[pattern_start] == b' ' {
                    pattern_start += 1;
                }
                if pattern_start >= comma {
                    return Err(CapturePartError::EmptyPattern(lossy_text(
                        &raw[start..=comma],
                    )));
                }
                pattern.apply_pattern(&raw[pattern_start..comma]);
                idx = pattern_start;
            }

            let mut name = None;
            if let Some(colon) = self.first_colon {
                let name_start = start + 1;
                if colon <= idx && colon > name_start {
                    let text = trim_captured_symbol(&raw[name_start..colon]);
                    if !text.is_empty() {
                        name = Some(text);
                    }
                }
            }

            let dest = match target {
                Target::Field(dotted_name) => CaptureDest::Field {
                    dotted_name,
                    resolved: None,
                },
                Target::Setter {
                    func_name,
                    arg0_type,
                    extra_args,
                } => CaptureDest::Setter {
                    func_name,
                    arg0_type,
                    extra_args,
                },
                Target::Handler { name, type_name } => {
                    CaptureDest::HandlerParam { name, type_name }
                }
            };
            PathPart {
                raw: raw[start..=end].to_vec(),
                kind: PartKind::Capture {
                    name,
                    pattern,
                    dest,
                },
            }
        };
        result.parts.push(part);
        Ok(())
    }
}

/// Reverse-scan a setter call ending at the `)` at `rparen`.
///
/// Returns the parsed target and the index the scan stopped on (an opening
/// brace, comma, or colon preceding the function name).
fn parse_setter(
    raw: &[u8],
    start: usize,
    rparen: usize,
) -> Result<(Target, usize), CapturePartError> {
    // Exclusive end positions of arguments, collected right to left.
    let mut arg_ends = vec![rparen];
    let mut idx = rparen - 1;
    let mut depth = 1usize;
    while idx > start {
        match raw[idx] {
            b')' => depth += 1,
            b'(' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            b',' if depth == 1 => arg_ends.push(idx),
            _ => {}
        }
        idx -= 1;
    }
    if raw[idx] != b'(' {
        return Err(CapturePartError::ParenthesisMismatch);
    }
    let paren_start = idx;
    while idx > start {
        if matches!(raw[idx], b'{' | b',' | b':') {
            break;
        }
        idx -= 1;
    }
    let next_index = idx;
    let name_start = idx + 1;
    if name_start >= paren_start {
        return Err(CapturePartError::MissingSetterName);
    }
    let func_name = trim_captured_symbol(&raw[name_start..paren_start]);

    let mut arg_end = *arg_ends.last().expect("seeded with rparen");
    let mut arg_start = paren_start + 1;
    if arg_start >= arg_end {
        return Err(CapturePartError::MissingSetterArg0);
    }
    let arg0_type = trim_captured_symbol(&raw[arg_start..arg_end]);
    arg_ends.pop();

    let mut extra_args = Vec::new();
    while let Some(&next_end) = arg_ends.last() {
        arg_start = arg_end + 1;
        arg_end = next_end;
        if arg_start >= arg_end {
            return Err(CapturePartError::MissingSetterArg(lossy_text(
                &raw[start..arg_end],
            )));
        }
        let value = trim_captured_symbol(&raw[arg_start..arg_end]);
        if value.is_empty() {
            return Err(CapturePartError::EmptySetterArg(lossy_text(
                &raw[start..arg_end],
            )));
        }
        extra_args.push(value);
        arg_ends.pop();
    }
    Ok((
        Target::Setter {
            func_name,
            arg0_type,
            extra_args,
        },
        next_index,
    ))
}

/// Reverse-scan a field-name or handler-parameter target ending at `last`.
///
/// A non-space byte to the left of an interior space marks the handler form
/// (`name type`); otherwise the region is a dotted field name.
fn parse_field_or_handler(
    raw: &[u8],
    start: usize,
    last: usize,
) -> Result<(Target, usize), CapturePartError> {
    let target_end = last + 1;
    let mut idx = last;
    let mut last_space: Option<usize> = None;
    let mut handler_mode = false;
    while idx > start {
        let ch = raw[idx];
        if matches!(ch, b'{' | b',' | b':') {
            break;
        }
        if ch == b' ' {
            if last_space.is_none() {
                last_space = Some(idx);
            }
        } else if last_space.is_some() {
            handler_mode = true;
        }
        idx -= 1;
    }
    let next_index = idx;
    let target_start = idx + 1;
    if target_start >= target_end {
        return Err(CapturePartError::MissingTarget);
    }
    if handler_mode {
        let space = last_space.expect("handler mode implies a space");
        let name = trim_captured_symbol(&raw[target_start..space]);
        if name.is_empty() {
            return Err(CapturePartError::EmptyHandlerParamName);
        }
        let type_name = trim_captured_symbol(&raw[space + 1..target_end]);
        if type_name.is_empty() {
            return Err(CapturePartError::EmptyHandlerParamType);
        }
        Ok((Target::Handler { name, type_name }, next_index))
    } else {
        let field = cleanup_field_name(&lossy_text(&raw[target_start..target_end]));
        if field.is_empty() {
            return Err(CapturePartError::EmptyFieldName);
        }
        Ok((Target::Field(field), next_index))
    }
}
