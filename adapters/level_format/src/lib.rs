#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text codec for Pipeflow level files.
//!
//! A level file is a sequence of `#`-headed sections:
//!
//! ```text
//! # rows
//! 5
//!
//! # cols
//! 5
//!
//! # delay before first flow
//! 3
//!
//! # map
//! WWWWW
//! W>..W
//! W...W
//! W...W
//! WWWvW
//!
//! # pipes
//! HZ,VT,BL
//! ```
//!
//! The `pipes` section is optional. Terminations on the border decode as
//! the sink, the one inside the grid as the source. Structural checks such
//! as the number of sources are left to the grid.

use std::fmt::Write as _;

use pipeflow_core::{Cell, Coordinate, Level, Pipe, PipeShape};
use thiserror::Error;

const HEADER_PREFIX: char = '#';
const PIPE_DELIMITER: char = ',';

/// Errors raised while decoding a level file.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelFormatError {
    /// A header line names no known section.
    #[error("line {line}: unknown section '{header}'")]
    UnknownSection {
        /// One-based line number of the header.
        line: usize,
        /// Header text after the `#`.
        header: String,
    },
    /// A section appears twice.
    #[error("line {line}: section '{section}' appears twice")]
    DuplicateSection {
        /// One-based line number of the second header.
        line: usize,
        /// Name of the repeated section.
        section: &'static str,
    },
    /// Content appears before the first header.
    #[error("line {line}: content outside of a section")]
    StrayContent {
        /// One-based line number of the content.
        line: usize,
    },
    /// A required section is absent or empty.
    #[error("section '{0}' is missing")]
    MissingSection(&'static str),
    /// A numeric section holds something other than one number.
    #[error("section '{section}' must hold a single number, found '{value}'")]
    InvalidNumber {
        /// Name of the section.
        section: &'static str,
        /// Offending content.
        value: String,
    },
    /// The map has a different number of lines than declared.
    #[error("map has {found} rows, expected {expected}")]
    MapRowCount {
        /// Declared number of rows.
        expected: u32,
        /// Number of map lines.
        found: usize,
    },
    /// A map line has a different number of cells than declared.
    #[error("map row {row} has {found} cells, expected {expected}")]
    MapRowLength {
        /// Zero-based row index.
        row: u32,
        /// Declared number of columns.
        expected: u32,
        /// Number of characters in the line.
        found: usize,
    },
    /// A map character encodes no cell.
    #[error("unknown cell code '{code}' at {coord}")]
    UnknownCell {
        /// Location of the character.
        coord: Coordinate,
        /// Offending character.
        code: char,
    },
    /// A pipe token names no shape.
    #[error("unknown pipe token '{0}'")]
    UnknownPipe(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Rows,
    Cols,
    Delay,
    Map,
    Pipes,
}

impl Section {
    const ALL: [Section; 5] = [
        Section::Rows,
        Section::Cols,
        Section::Delay,
        Section::Map,
        Section::Pipes,
    ];

    fn from_header(header: &str) -> Option<Self> {
        let header = header.trim().to_ascii_lowercase();
        if header == "rows" {
            Some(Self::Rows)
        } else if header == "cols" || header == "columns" {
            Some(Self::Cols)
        } else if header.starts_with("delay") {
            Some(Self::Delay)
        } else if header == "map" {
            Some(Self::Map)
        } else if header == "pipes" {
            Some(Self::Pipes)
        } else {
            None
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Rows => "rows",
            Self::Cols => "cols",
            Self::Delay => "delay before first flow",
            Self::Map => "map",
            Self::Pipes => "pipes",
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Rows => 0,
            Self::Cols => 1,
            Self::Delay => 2,
            Self::Map => 3,
            Self::Pipes => 4,
        }
    }
}

/// Decodes a level file.
pub fn parse(contents: &str) -> Result<Level, LevelFormatError> {
    let sections = split_sections(contents)?;

    let rows = number(&sections, Section::Rows)?;
    let cols = number(&sections, Section::Cols)?;
    let delay = number(&sections, Section::Delay)?;
    let cells = map(&sections[Section::Map.slot()], rows, cols)?;
    let pipes = pipes(&sections[Section::Pipes.slot()])?;

    Ok(Level {
        rows,
        cols,
        delay,
        cells,
        pipes,
    })
}

/// Encodes a level in the format accepted by [`parse`].
#[must_use]
pub fn write(level: &Level) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n{}\n", Section::Rows.name(), level.rows);
    let _ = writeln!(out, "# {}\n{}\n", Section::Cols.name(), level.cols);
    let _ = writeln!(out, "# {}\n{}\n", Section::Delay.name(), level.delay);

    let _ = writeln!(out, "# {}", Section::Map.name());
    for row in &level.cells {
        let line: String = row.iter().map(Cell::to_char).collect();
        let _ = writeln!(out, "{line}");
    }

    if let Some(pipes) = &level.pipes {
        let tokens: Vec<&str> = pipes.iter().map(|pipe| pipe.shape().token()).collect();
        let _ = writeln!(out, "\n# {}", Section::Pipes.name());
        let _ = writeln!(out, "{}", tokens.join(&PIPE_DELIMITER.to_string()));
    }

    out
}

/// Groups non-blank lines under their section header.
fn split_sections(contents: &str) -> Result<Vec<Option<Vec<&str>>>, LevelFormatError> {
    let mut sections: Vec<Option<Vec<&str>>> = vec![None; Section::ALL.len()];
    let mut current: Option<Section> = None;

    for (index, raw) in contents.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        if let Some(header) = line.trim_start().strip_prefix(HEADER_PREFIX) {
            let section =
                Section::from_header(header).ok_or_else(|| LevelFormatError::UnknownSection {
                    line: line_number,
                    header: header.trim().to_owned(),
                })?;
            let slot = &mut sections[section.slot()];
            if slot.is_some() {
                return Err(LevelFormatError::DuplicateSection {
                    line: line_number,
                    section: section.name(),
                });
            }
            *slot = Some(Vec::new());
            current = Some(section);
            continue;
        }

        let Some(section) = current else {
            return Err(LevelFormatError::StrayContent { line: line_number });
        };
        if let Some(lines) = sections[section.slot()].as_mut() {
            lines.push(line);
        }
    }

    Ok(sections)
}

fn number(sections: &[Option<Vec<&str>>], section: Section) -> Result<u32, LevelFormatError> {
    let lines = sections[section.slot()]
        .as_ref()
        .filter(|lines| !lines.is_empty())
        .ok_or(LevelFormatError::MissingSection(section.name()))?;

    let value = lines.join(" ");
    value
        .trim()
        .parse()
        .map_err(|_| LevelFormatError::InvalidNumber {
            section: section.name(),
            value: value.trim().to_owned(),
        })
}

fn map(
    lines: &Option<Vec<&str>>,
    rows: u32,
    cols: u32,
) -> Result<Vec<Vec<Cell>>, LevelFormatError> {
    let lines = lines
        .as_ref()
        .filter(|lines| !lines.is_empty())
        .ok_or(LevelFormatError::MissingSection(Section::Map.name()))?;

    if lines.len() != rows as usize {
        return Err(LevelFormatError::MapRowCount {
            expected: rows,
            found: lines.len(),
        });
    }

    (0..rows)
        .zip(lines)
        .map(|(row, line)| {
            let codes: Vec<char> = line.trim().chars().collect();
            if codes.len() != cols as usize {
                return Err(LevelFormatError::MapRowLength {
                    row,
                    expected: cols,
                    found: codes.len(),
                });
            }

            (0..cols)
                .zip(codes)
                .map(|(col, code)| {
                    let coord = Coordinate::new(row, col);
                    let on_border = row == 0 || col == 0 || row + 1 == rows || col + 1 == cols;
                    Cell::from_char(code, coord, on_border)
                        .ok_or(LevelFormatError::UnknownCell { coord, code })
                })
                .collect()
        })
        .collect()
}

fn pipes(lines: &Option<Vec<&str>>) -> Result<Option<Vec<Pipe>>, LevelFormatError> {
    let Some(lines) = lines else {
        return Ok(None);
    };

    let mut pipes = Vec::new();
    for token in lines
        .iter()
        .flat_map(|line| line.split(PIPE_DELIMITER))
        .map(str::trim)
        .filter(|token| !token.is_empty())
    {
        let shape = PipeShape::from_token(&token.to_ascii_uppercase())
            .ok_or_else(|| LevelFormatError::UnknownPipe(token.to_owned()))?;
        pipes.push(Pipe::new(shape));
    }
    Ok(Some(pipes))
}
