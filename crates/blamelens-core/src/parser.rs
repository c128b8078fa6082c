//! Parser for `git blame --porcelain` output.
//!
//! The stream is a sequence of records:
//! ```text
//! <40-hex sha> <orig_line> <final_line> [<group_size>]
//! author <name>                \
//! author-mail <<email>>         |
//! author-time <epoch>           |
//! author-tz <+HHMM>             |
//! committer <name>              |  only the first time a sha appears
//! committer-mail <<email>>      |
//! committer-time <epoch>        |
//! committer-tz <+HHMM>          |
//! summary <text>                |
//! [previous <sha> <path>]       |
//! [boundary]                    |
//! filename <path>              /
//! <code line>
//! ```
//!
//! Parsing never fails. Records that do not fit the grammar, including a
//! truncated final record, are dropped and the rest of the stream is kept.

use crate::model::{short_sha, Author, Blame, Commit, CommitLine};
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;
use tracing::trace;

/// Parse porcelain blame output for `file_name` (relative to the repository root).
pub fn parse_porcelain(data: &str, file_name: &str) -> Blame {
    let mut builder = BlameBuilder::new(file_name);
    let mut state = State::AwaitingHeader;

    for line in data.lines() {
        state = match state {
            State::AwaitingHeader => awaiting_header(line),
            // Metadata is only emitted on a commit's first record.
            State::AfterHeader(header) if builder.knows(header.sha) => {
                builder.push(&header, None);
                State::AwaitingHeader
            }
            State::AfterHeader(header) => {
                let mut block = MetadataBlock::default();
                match block.feed(line) {
                    // Not a metadata block: the line is the record's code line.
                    Step::Mismatch => {
                        builder.push(&header, None);
                        State::AwaitingHeader
                    }
                    Step::Continue => State::AwaitingMetadata(header, block),
                    Step::Complete(metadata) => State::AwaitingCode(header, Some(metadata)),
                }
            }
            State::AwaitingMetadata(header, mut block) => match block.feed(line) {
                Step::Continue => State::AwaitingMetadata(header, block),
                Step::Complete(metadata) => State::AwaitingCode(header, Some(metadata)),
                Step::Mismatch => {
                    trace!(sha = header.sha, line, "Dropping record with malformed metadata");
                    awaiting_header(line)
                }
            },
            State::AwaitingCode(header, metadata) => {
                builder.push(&header, metadata);
                State::AwaitingHeader
            }
        };
    }

    if let Some(sha) = state.pending_sha() {
        trace!(sha, "Dropping truncated record at end of stream");
    }

    builder.finish()
}

fn awaiting_header(line: &str) -> State<'_> {
    match parse_header(line) {
        Some(header) => State::AfterHeader(header),
        None => State::AwaitingHeader,
    }
}

/// Parser position within the current record.
enum State<'a> {
    AwaitingHeader,
    AfterHeader(Header<'a>),
    AwaitingMetadata(Header<'a>, MetadataBlock<'a>),
    AwaitingCode(Header<'a>, Option<Metadata<'a>>),
}

impl<'a> State<'a> {
    fn pending_sha(&self) -> Option<&'a str> {
        match self {
            State::AwaitingHeader => None,
            State::AfterHeader(h) | State::AwaitingMetadata(h, _) | State::AwaitingCode(h, _) => {
                Some(h.sha)
            }
        }
    }
}

/// `<sha> <orig_line> <final_line> [<group_size>]`, positions 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header<'a> {
    sha: &'a str,
    original_line: usize,
    final_line: usize,
}

fn parse_header(line: &str) -> Option<Header<'_>> {
    let mut parts = line.split_whitespace();
    let sha = parts.next()?;
    if sha.len() != 40 || !sha.chars().all(|c| c == '^' || c.is_ascii_hexdigit()) {
        return None;
    }
    let sha = sha.trim_start_matches('^');
    if sha.is_empty() {
        return None;
    }

    let original_line = parse_position(parts.next()?)?;
    let final_line = parse_position(parts.next()?)?;
    if let Some(group_size) = parts.next() {
        group_size.parse::<usize>().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }

    Some(Header {
        sha: short_sha(sha),
        original_line,
        final_line,
    })
}

fn parse_position(s: &str) -> Option<usize> {
    s.parse::<usize>().ok().filter(|n| *n > 0)
}

/// Fields of a metadata block, in the order git emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Field {
    #[default]
    Author,
    AuthorMail,
    AuthorTime,
    AuthorTz,
    Committer,
    CommitterMail,
    CommitterTime,
    CommitterTz,
    Summary,
    /// Optional `previous`/`boundary` lines, then `filename`.
    Trailer,
}

impl Field {
    fn key(self) -> &'static str {
        match self {
            Field::Author => "author",
            Field::AuthorMail => "author-mail",
            Field::AuthorTime => "author-time",
            Field::AuthorTz => "author-tz",
            Field::Committer => "committer",
            Field::CommitterMail => "committer-mail",
            Field::CommitterTime => "committer-time",
            Field::CommitterTz => "committer-tz",
            Field::Summary => "summary",
            Field::Trailer => "filename",
        }
    }

    fn next(self) -> Field {
        match self {
            Field::Author => Field::AuthorMail,
            Field::AuthorMail => Field::AuthorTime,
            Field::AuthorTime => Field::AuthorTz,
            Field::AuthorTz => Field::Committer,
            Field::Committer => Field::CommitterMail,
            Field::CommitterMail => Field::CommitterTime,
            Field::CommitterTime => Field::CommitterTz,
            Field::CommitterTz => Field::Summary,
            Field::Summary | Field::Trailer => Field::Trailer,
        }
    }
}

/// Value of `<key> <value>`; a bare `<key>` has an empty value.
fn field_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(key)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix(' ')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Metadata<'a> {
    author: &'a str,
    author_mail: &'a str,
    author_time: &'a str,
    author_tz: &'a str,
    summary: &'a str,
    previous: Option<(&'a str, &'a str)>,
    boundary: bool,
    filename: &'a str,
}

#[derive(Debug, Default)]
struct MetadataBlock<'a> {
    expecting: Field,
    author: &'a str,
    author_mail: &'a str,
    author_time: &'a str,
    author_tz: &'a str,
    summary: &'a str,
    previous: Option<(&'a str, &'a str)>,
    boundary: bool,
}

enum Step<'a> {
    Continue,
    Complete(Metadata<'a>),
    Mismatch,
}

impl<'a> MetadataBlock<'a> {
    fn feed(&mut self, line: &'a str) -> Step<'a> {
        if self.expecting == Field::Trailer {
            return self.feed_trailer(line);
        }

        let Some(value) = field_value(line, self.expecting.key()) else {
            return Step::Mismatch;
        };
        match self.expecting {
            Field::Author => self.author = value,
            Field::AuthorMail => self.author_mail = value,
            Field::AuthorTime => self.author_time = value,
            Field::AuthorTz => self.author_tz = value,
            Field::Summary => self.summary = value,
            _ => {}
        }
        self.expecting = self.expecting.next();
        Step::Continue
    }

    fn feed_trailer(&mut self, line: &'a str) -> Step<'a> {
        if let Some(filename) = field_value(line, "filename") {
            return Step::Complete(Metadata {
                author: self.author,
                author_mail: self.author_mail,
                author_time: self.author_time,
                author_tz: self.author_tz,
                summary: self.summary,
                previous: self.previous,
                boundary: self.boundary,
                filename,
            });
        }

        if let Some(previous) = field_value(line, "previous") {
            match previous.split_once(' ') {
                Some((sha, path)) if !sha.is_empty() => {
                    self.previous = Some((sha, path));
                    Step::Continue
                }
                _ => Step::Mismatch,
            }
        } else if line == "boundary" {
            self.boundary = true;
            Step::Continue
        } else {
            Step::Mismatch
        }
    }
}

/// Parse `<epoch seconds>` and `<±HHMM>` into an instant carrying the offset.
fn parse_date(time: &str, tz: &str) -> Option<DateTime<FixedOffset>> {
    let seconds: i64 = time.trim().parse().ok()?;

    let tz = tz.trim();
    let (sign, digits) = match tz.as_bytes().first()? {
        b'+' => (1, &tz[1..]),
        b'-' => (-1, &tz[1..]),
        _ => return None,
    };
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?;

    Some(DateTime::from_timestamp(seconds, 0)?.with_timezone(&offset))
}

/// Accumulates records into a [`Blame`].
struct BlameBuilder<'a> {
    file_name: &'a str,
    authors: Vec<Author>,
    author_index: HashMap<String, usize>,
    commits: Vec<Commit>,
    commit_index: HashMap<String, usize>,
    lines: Vec<CommitLine>,
}

impl<'a> BlameBuilder<'a> {
    fn new(file_name: &'a str) -> Self {
        Self {
            file_name,
            authors: Vec::new(),
            author_index: HashMap::new(),
            commits: Vec::new(),
            commit_index: HashMap::new(),
            lines: Vec::new(),
        }
    }

    fn knows(&self, sha: &str) -> bool {
        self.commit_index.contains_key(sha)
    }

    fn push(&mut self, header: &Header<'_>, metadata: Option<Metadata<'_>>) {
        let index = match self.commit_index.get(header.sha) {
            Some(&index) => index,
            None => {
                let Some(metadata) = metadata else {
                    trace!(sha = header.sha, "Dropping record for a commit with no metadata");
                    return;
                };
                let Some(commit) = self.new_commit(header.sha, &metadata) else {
                    trace!(sha = header.sha, "Dropping record with an unparseable date");
                    return;
                };
                self.commits.push(commit);
                self.commit_index
                    .insert(header.sha.to_string(), self.commits.len() - 1);
                self.commits.len() - 1
            }
        };

        let line = CommitLine {
            sha: header.sha.to_string(),
            line: header.final_line - 1,
            original_line: header.original_line - 1,
        };
        self.commits[index].lines.push(line.clone());
        self.lines.push(line);
    }

    fn new_commit(&mut self, sha: &str, metadata: &Metadata<'_>) -> Option<Commit> {
        let date = parse_date(metadata.author_time, metadata.author_tz)?;

        let author = metadata.author.trim();
        if !self.author_index.contains_key(author) {
            self.authors.push(Author::new(author));
            self.author_index
                .insert(author.to_string(), self.authors.len() - 1);
        }

        let original_file_name = (!self
            .file_name
            .to_lowercase()
            .ends_with(&metadata.filename.to_lowercase()))
        .then(|| metadata.filename.to_string());

        Some(Commit {
            sha: sha.to_string(),
            file_name: self.file_name.to_string(),
            author: author.to_string(),
            author_email: metadata
                .author_mail
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string(),
            date,
            message: metadata.summary.to_string(),
            lines: Vec::new(),
            original_file_name,
            previous_sha: metadata.previous.map(|(sha, _)| short_sha(sha).to_string()),
            previous_file_name: metadata.previous.map(|(_, path)| path.to_string()),
            boundary: metadata.boundary,
        })
    }

    fn finish(mut self) -> Blame {
        for commit in &self.commits {
            if let Some(&index) = self.author_index.get(&commit.author) {
                self.authors[index].line_count += commit.lines.len();
            }
        }

        // Stable sorts: equal line counts keep parse order.
        self.authors.sort_by(|a, b| b.line_count.cmp(&a.line_count));
        self.commits
            .sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.sha.cmp(&b.sha)));
        self.lines.sort_by_key(|l| l.line);

        Blame {
            authors: self.authors,
            commits: self.commits,
            lines: self.lines,
        }
    }
}
