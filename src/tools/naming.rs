/// Where the classifier leaves its outputs for a chunk
///
/// BOLDigger3 releases have placed their result files in different spots.
/// Each artifact kind carries an ordered list of variants and the first
/// existing, non-empty candidate wins.
use std::fmt;
use std::path::{Path, PathBuf};

/// Scratch directory the classifier creates next to its input.
pub const TOOL_DATA_DIR: &str = "boldigger3_data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Tabular,
    Columnar,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Tabular => write!(f, "tabular"),
            ArtifactKind::Columnar => write!(f, "columnar"),
        }
    }
}

/// One candidate location, relative to the chunk file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingVariant {
    /// `<chunk dir>/boldigger3_data/<chunk stem><suffix>`
    DataDir { suffix: String },
    /// `<chunk dir>/<chunk stem><suffix>`
    BesideChunk { suffix: String },
    /// Older releases: still under the data dir, with their own suffixes
    LegacyDataDir { suffix: String },
}

impl NamingVariant {
    pub fn data_dir(suffix: &str) -> Self {
        NamingVariant::DataDir {
            suffix: suffix.to_string(),
        }
    }

    pub fn beside_chunk(suffix: &str) -> Self {
        NamingVariant::BesideChunk {
            suffix: suffix.to_string(),
        }
    }

    pub fn legacy(suffix: &str) -> Self {
        NamingVariant::LegacyDataDir {
            suffix: suffix.to_string(),
        }
    }

    /// Concrete path for `chunk`, or `None` if the chunk path has no stem.
    pub fn resolve(&self, chunk: &Path) -> Option<PathBuf> {
        let stem = chunk.file_stem()?.to_str()?;
        let dir = chunk.parent().unwrap_or_else(|| Path::new(""));

        let path = match self {
            NamingVariant::DataDir { suffix } | NamingVariant::LegacyDataDir { suffix } => {
                dir.join(TOOL_DATA_DIR).join(format!("{}{}", stem, suffix))
            }
            NamingVariant::BesideChunk { suffix } => dir.join(format!("{}{}", stem, suffix)),
        };
        Some(path)
    }

    pub fn label(&self) -> &'static str {
        match self {
            NamingVariant::DataDir { .. } => "data-dir",
            NamingVariant::BesideChunk { .. } => "beside-chunk",
            NamingVariant::LegacyDataDir { .. } => "legacy",
        }
    }
}

/// Ordered variants for both artifact kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingScheme {
    pub tabular: Vec<NamingVariant>,
    pub columnar: Vec<NamingVariant>,
}

impl NamingScheme {
    /// Layouts produced by the BOLDigger3 releases seen so far.
    pub fn boldigger3() -> Self {
        Self {
            tabular: vec![
                NamingVariant::data_dir("_identification_result.xlsx"),
                NamingVariant::beside_chunk("_identification_result.xlsx"),
                NamingVariant::legacy("_bold_results_part_1.xlsx"),
            ],
            columnar: vec![
                NamingVariant::data_dir("_identification_result.parquet.snappy"),
                NamingVariant::beside_chunk("_identification_result.parquet.snappy"),
                NamingVariant::legacy("_identification_result.parquet"),
            ],
        }
    }

    pub fn variants(&self, kind: ArtifactKind) -> &[NamingVariant] {
        match kind {
            ArtifactKind::Tabular => &self.tabular,
            ArtifactKind::Columnar => &self.columnar,
        }
    }

    /// Every candidate path for `kind`, in priority order.
    pub fn candidates(&self, kind: ArtifactKind, chunk: &Path) -> Vec<PathBuf> {
        self.variants(kind)
            .iter()
            .filter_map(|variant| variant.resolve(chunk))
            .collect()
    }

    /// First candidate that exists and is non-empty.
    pub fn locate(&self, kind: ArtifactKind, chunk: &Path) -> Option<(PathBuf, &NamingVariant)> {
        self.variants(kind).iter().find_map(|variant| {
            let path = variant.resolve(chunk)?;
            crate::utils::fs::is_nonempty_file(&path).then_some((path, variant))
        })
    }

    /// Candidates of both kinds, used to clear leftovers before an attempt.
    pub fn all_candidates(&self, chunk: &Path) -> Vec<PathBuf> {
        let mut paths = self.candidates(ArtifactKind::Tabular, chunk);
        paths.extend(self.candidates(ArtifactKind::Columnar, chunk));
        paths
    }
}

impl Default for NamingScheme {
    fn default() -> Self {
        Self::boldigger3()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_variants_resolve_relative_to_chunk() {
        let chunk = Path::new("/w/chunks/in_chunk_004.fasta");
        let scheme = NamingScheme::boldigger3();

        assert_eq!(
            scheme.candidates(ArtifactKind::Columnar, chunk),
            vec![
                PathBuf::from("/w/chunks/boldigger3_data/in_chunk_004_identification_result.parquet.snappy"),
                PathBuf::from("/w/chunks/in_chunk_004_identification_result.parquet.snappy"),
                PathBuf::from("/w/chunks/boldigger3_data/in_chunk_004_identification_result.parquet"),
            ]
        );
        assert_eq!(
            scheme.candidates(ArtifactKind::Tabular, chunk)[2],
            PathBuf::from("/w/chunks/boldigger3_data/in_chunk_004_bold_results_part_1.xlsx")
        );
    }

    #[test]
    fn test_locate_prefers_earlier_variant_and_skips_empty() {
        let dir = tempfile::tempdir().unwrap();
        let chunk = dir.path().join("s_chunk_001.fasta");
        let scheme = NamingScheme::boldigger3();
        let candidates = scheme.candidates(ArtifactKind::Tabular, &chunk);

        std::fs::create_dir_all(dir.path().join(TOOL_DATA_DIR)).unwrap();
        std::fs::write(&candidates[0], b"").unwrap();
        std::fs::write(&candidates[1], b"data").unwrap();
        std::fs::write(&candidates[2], b"data").unwrap();

        let (path, variant) = scheme.locate(ArtifactKind::Tabular, &chunk).unwrap();
        assert_eq!(path, candidates[1]);
        assert_eq!(variant.label(), "beside-chunk");
    }

    #[test]
    fn test_locate_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let chunk = dir.path().join("s_chunk_001.fasta");
        assert!(NamingScheme::boldigger3()
            .locate(ArtifactKind::Columnar, &chunk)
            .is_none());
    }
}
