// ==============================================================================
// genomeloc.rs - Genomic Coordinates
// ==============================================================================
// Description: Chromosome indexing, xpos encoding and region string parsing
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use thiserror::Error;

/// Multiplier separating the chromosome index from the position in an xpos
pub const XPOS_CHROM_FACTOR: i64 = 1_000_000_000;

/// Errors raised while parsing genomic coordinates
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegionError {
    #[error("Invalid chromosome: {0}")]
    InvalidChromosome(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Region end {end} is before start {start}")]
    EndBeforeStart { start: i64, end: i64 },

    #[error("Invalid region format: {0}")]
    InvalidFormat(String),
}

/// Map a chromosome name to its index (1-22, X=23, Y=24, M=25)
///
/// Accepts an optional `chr` prefix and is case-insensitive.
pub fn chrom_index(chrom: &str) -> Result<i64, RegionError> {
    let trimmed = chrom.trim();
    let lower = trimmed.to_ascii_lowercase();
    let name = lower.strip_prefix("chr").unwrap_or(&lower);

    let index = match name {
        "x" => 23,
        "y" => 24,
        "m" | "mt" => 25,
        _ => match name.parse::<i64>() {
            Ok(n) if (1..=22).contains(&n) => n,
            _ => return Err(RegionError::InvalidChromosome(trimmed.to_string())),
        },
    };

    Ok(index)
}

/// Encode a chromosome and 1-based position as a single sortable integer
pub fn xpos(chrom: &str, pos: i64) -> Result<i64, RegionError> {
    if !(1..XPOS_CHROM_FACTOR).contains(&pos) {
        return Err(RegionError::InvalidPosition(pos.to_string()));
    }
    Ok(chrom_index(chrom)? * XPOS_CHROM_FACTOR + pos)
}

fn parse_position(raw: &str) -> Result<i64, RegionError> {
    let digits: String = raw.trim().chars().filter(|c| *c != ',').collect();
    digits
        .parse::<i64>()
        .map_err(|_| RegionError::InvalidPosition(raw.trim().to_string()))
}

/// Parse `chr1:1,000-2,000` (or `1:1000`) into an inclusive `(xstart, xend)` pair
pub fn parse_region(raw: &str) -> Result<(i64, i64), RegionError> {
    let (chrom, range) = raw
        .trim()
        .split_once(':')
        .ok_or_else(|| RegionError::InvalidFormat(raw.trim().to_string()))?;

    let (start, end) = match range.split_once('-') {
        Some((start, end)) => (parse_position(start)?, parse_position(end)?),
        None => {
            let pos = parse_position(range)?;
            (pos, pos)
        }
    };

    if end < start {
        return Err(RegionError::EndBeforeStart { start, end });
    }

    Ok((xpos(chrom, start)?, xpos(chrom, end)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrom_index() {
        assert_eq!(chrom_index("1").unwrap(), 1);
        assert_eq!(chrom_index("chr22").unwrap(), 22);
        assert_eq!(chrom_index("ChrX").unwrap(), 23);
        assert_eq!(chrom_index("Y").unwrap(), 24);
        assert_eq!(chrom_index("MT").unwrap(), 25);
        assert!(chrom_index("23").is_err());
        assert!(chrom_index("chrUn").is_err());
    }

    #[test]
    fn test_xpos() {
        assert_eq!(xpos("chr1", 12345).unwrap(), 1_000_012_345);
        assert_eq!(xpos("X", 1).unwrap(), 23_000_000_001);
        assert!(xpos("1", 0).is_err());
        assert!(xpos("1", XPOS_CHROM_FACTOR).is_err());
    }

    #[test]
    fn test_parse_region() {
        assert_eq!(
            parse_region("chr2:1,000-2,000").unwrap(),
            (2_000_001_000, 2_000_002_000)
        );
        assert_eq!(parse_region("3:500").unwrap(), (3_000_000_500, 3_000_000_500));
    }

    #[test]
    fn test_parse_region_rejects_bad_input() {
        assert!(matches!(
            parse_region("chr1:2000-1000"),
            Err(RegionError::EndBeforeStart { .. })
        ));
        assert!(matches!(parse_region("BRCA1"), Err(RegionError::InvalidFormat(_))));
        assert!(matches!(
            parse_region("chr1:abc-200"),
            Err(RegionError::InvalidPosition(_))
        ));
        assert!(matches!(
            parse_region("chr99:1-2"),
            Err(RegionError::InvalidChromosome(_))
        ));
    }
}
