use crate::bio::sequence::Sequence;
use crate::BoldChunkError;
use flate2::read::GzDecoder;
use memmap2::Mmap;
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{line_ending, not_line_ending},
    combinator::{map, opt},
    sequence::preceded,
    IResult,
};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Residues per line when writing.
const LINE_WIDTH: usize = 80;

/// Parse a FASTA header line
fn parse_header(input: &[u8]) -> IResult<&[u8], (&str, Option<&str>)> {
    let (input, _) = tag(b">")(input)?;
    let (input, id) = map(
        take_till(|c: u8| c == b' ' || c == b'\t' || c == b'\n' || c == b'\r'),
        |s| std::str::from_utf8(s).unwrap_or(""),
    )(input)?;
    let (input, description) = opt(preceded(
        take_till(|c: u8| c != b' ' && c != b'\t'),
        map(not_line_ending, |s| std::str::from_utf8(s).unwrap_or("")),
    ))(input)?;
    let (input, _) = opt(line_ending)(input)?;
    let description = description.filter(|d| !d.trim().is_empty());
    Ok((input, (id, description)))
}

/// Parse sequence lines until next header or EOF
fn parse_sequence(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let mut sequence = Vec::new();
    let mut remaining = input;

    while !remaining.is_empty() && remaining[0] != b'>' {
        let (rest, line) =
            take_till::<_, _, nom::error::Error<_>>(|c: u8| c == b'\n' || c == b'\r')(remaining)?;
        let (rest, _) = opt(line_ending)(rest)?;

        sequence.extend(line.iter().copied().filter(|c| !c.is_ascii_whitespace()));

        // a lone '\r' is not a line ending for nom, step over it
        remaining = match rest.first() {
            Some(b'\r') => &rest[1..],
            _ => rest,
        };
    }

    Ok((remaining, sequence))
}

/// Parse a single FASTA record
fn parse_record(input: &[u8]) -> IResult<&[u8], Sequence> {
    let (input, (id, description)) = parse_header(input)?;
    let (input, residues) = parse_sequence(input)?;

    let mut seq = Sequence::new(id.to_string(), residues);
    if let Some(desc) = description {
        seq = seq.with_description(desc.trim_end().to_string());
    }

    Ok((input, seq))
}

/// Parse FASTA records from a byte buffer, preserving file order.
pub fn parse_fasta_from_bytes(buffer: &[u8]) -> Result<Vec<Sequence>, BoldChunkError> {
    let mut input = buffer;
    let mut sequences = Vec::new();

    loop {
        while !input.is_empty() && input[0].is_ascii_whitespace() {
            input = &input[1..];
        }

        if input.is_empty() {
            break;
        }

        if input[0] != b'>' {
            return Err(BoldChunkError::Parse(format!(
                "Expected '>' at start of record {}",
                sequences.len() + 1
            )));
        }

        match parse_record(input) {
            Ok((remaining, seq)) => {
                if seq.id.is_empty() {
                    return Err(BoldChunkError::Parse(format!(
                        "Record {} has an empty identifier",
                        sequences.len() + 1
                    )));
                }
                sequences.push(seq);
                input = remaining;
            }
            Err(e) => {
                return Err(BoldChunkError::Parse(format!("Failed to parse FASTA: {:?}", e)));
            }
        }
    }

    Ok(sequences)
}

/// Parse a FASTA file into sequences (supports .gz compression).
///
/// Identifiers must be unique within the file.
pub fn parse_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<Sequence>, BoldChunkError> {
    let path = path.as_ref();

    let sequences = if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        parse_fasta_gzip(path)?
    } else {
        parse_fasta_uncompressed(path)?
    };

    ensure_unique_ids(&sequences)?;
    Ok(sequences)
}

fn parse_fasta_uncompressed(path: &Path) -> Result<Vec<Sequence>, BoldChunkError> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(Vec::new());
    }
    // SAFETY: the input is only read, and concurrent writers are unsupported.
    let mmap = unsafe { Mmap::map(&file)? };

    parse_fasta_from_bytes(&mmap[..])
}

fn parse_fasta_gzip(path: &Path) -> Result<Vec<Sequence>, BoldChunkError> {
    let file = File::open(path)?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut buffer = Vec::new();
    decoder.read_to_end(&mut buffer)?;

    parse_fasta_from_bytes(&buffer)
}

/// Reject collections where an identifier appears more than once.
pub fn ensure_unique_ids(sequences: &[Sequence]) -> Result<(), BoldChunkError> {
    let mut seen = HashSet::with_capacity(sequences.len());
    for seq in sequences {
        if !seen.insert(seq.id.as_str()) {
            return Err(BoldChunkError::Parse(format!(
                "Duplicate record identifier: {}",
                seq.id
            )));
        }
    }
    Ok(())
}

/// Write sequences to a FASTA file (supports .gz compression)
pub fn write_fasta<P: AsRef<Path>>(path: P, sequences: &[Sequence]) -> Result<(), BoldChunkError> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let path = path.as_ref();
    let file = File::create(path)?;

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        let encoder = GzEncoder::new(file, Compression::default());
        let mut writer = BufWriter::new(encoder);
        write_fasta_to_writer(&mut writer, sequences)?;
        writer.flush()?;
    } else {
        let mut writer = BufWriter::new(file);
        write_fasta_to_writer(&mut writer, sequences)?;
        writer.flush()?;
    }

    Ok(())
}

/// Write sequences to any writer
pub fn write_fasta_to_writer<W: Write>(
    writer: &mut W,
    sequences: &[Sequence],
) -> Result<(), BoldChunkError> {
    for seq in sequences {
        writeln!(writer, "{}", seq.header())?;

        for line in seq.sequence.chunks(LINE_WIDTH) {
            writer.write_all(line)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}
