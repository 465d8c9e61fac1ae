use super::parsers::{
    is_block_comment_end, is_block_comment_start, is_line_comment_start, matches_tag,
    try_start_dollar_quote,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment(u32),
    DollarQuoted(String),
}

/// Yields the offsets of bytes that are plain SQL, skipping quoted strings and identifiers,
/// line and (nested) block comments, and dollar-quoted blocks.
pub(super) struct CodeBytes<'a> {
    bytes: &'a [u8],
    idx: usize,
    state: State,
}

impl<'a> CodeBytes<'a> {
    pub(super) fn new(sql: &'a str) -> Self {
        Self {
            bytes: sql.as_bytes(),
            idx: 0,
            state: State::Normal,
        }
    }
}

impl Iterator for CodeBytes<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let bytes = self.bytes;
        while self.idx < bytes.len() {
            let idx = self.idx;
            let b = bytes[idx];
            self.idx += 1;
            match &self.state {
                State::Normal => match b {
                    b'\'' => self.state = State::SingleQuoted,
                    b'"' => self.state = State::DoubleQuoted,
                    _ if is_line_comment_start(bytes, idx) => {
                        self.state = State::LineComment;
                        self.idx += 1;
                    }
                    _ if is_block_comment_start(bytes, idx) => {
                        self.state = State::BlockComment(1);
                        self.idx += 1;
                    }
                    b'$' => match try_start_dollar_quote(bytes, idx) {
                        Some((tag, close)) => {
                            self.state = State::DollarQuoted(tag);
                            self.idx = close + 1;
                        }
                        None => return Some(idx),
                    },
                    _ => return Some(idx),
                },
                State::SingleQuoted | State::DoubleQuoted => {
                    let quote = if self.state == State::SingleQuoted {
                        b'\''
                    } else {
                        b'"'
                    };
                    if b == quote {
                        if bytes.get(idx + 1) == Some(&quote) {
                            self.idx += 1; // escaped quote
                        } else {
                            self.state = State::Normal;
                        }
                    }
                }
                State::LineComment => {
                    if b == b'\n' {
                        self.state = State::Normal;
                    }
                }
                State::BlockComment(depth) => {
                    let depth = *depth;
                    if is_block_comment_start(bytes, idx) {
                        self.state = State::BlockComment(depth + 1);
                        self.idx += 1;
                    } else if is_block_comment_end(bytes, idx) {
                        self.state = if depth == 1 {
                            State::Normal
                        } else {
                            State::BlockComment(depth - 1)
                        };
                        self.idx += 1;
                    }
                }
                State::DollarQuoted(tag) => {
                    if b == b'$' && matches_tag(bytes, idx, tag) {
                        self.idx = idx + tag.len() + 2;
                        self.state = State::Normal;
                    }
                }
            }
        }
        None
    }
}
