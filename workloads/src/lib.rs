pub mod compress;
pub mod hash;
pub mod ml;
pub mod shuttle;
pub mod word_count;
pub mod xml;

#[cfg(test)]
mod registry_test;
#[cfg(test)]
mod word_count_test;

use anyhow::Result;
use skperf_core::{WorkloadDescriptor, WorkloadRegistry};

pub const NASA_DATA: &str = "https://aiweb.cs.washington.edu/research/projects/xmltk/xmldata/data/nasa/nasa.xml.gz";
pub const HAMLET_TEXT: &str = "https://gist.githubusercontent.com/provpup/2fc41686eab7400b796b/raw/b575bd01a58494dfddc1d6429ef0167e709abf9b/hamlet.txt";
pub const ENGLISH_WORDS: &str = "https://raw.githubusercontent.com/dwyl/english-words/master/words_alpha.txt";
pub const SHUTTLE_DATA: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/statlog/shuttle/shuttle.tst";
pub const SWISSPROT_DATA: &str =
    "https://aiweb.cs.washington.edu/research/projects/xmltk/xmldata/data/SwissProt/SwissProt.xml.gz";
/// Declared for completeness; no workload in the default suite binds it.
pub const EL_NINO_DATA: &str = "https://archive.ics.uci.edu/ml/machine-learning-databases/el_nino-mld/tao-all2.dat.gz";

/// Register the default workload suite, in the order it is run and reported.
pub fn register_default_workloads(registry: &mut WorkloadRegistry) -> Result<()> {
    registry.register(
        WorkloadDescriptor::new("locally linear embedding", ml::lle::LocallyLinearEmbedding::default())
            .with_fixtures([(shuttle::FIXTURE, SHUTTLE_DATA)]),
    )?;
    registry.register(
        WorkloadDescriptor::new("random forest", ml::forest::RandomForestSearch::default())
            .with_fixtures([(shuttle::FIXTURE, SHUTTLE_DATA)])
            .multicore(true),
    )?;
    registry.register(
        WorkloadDescriptor::new("support vector machine", ml::svm::SupportVectorSearch::default())
            .with_fixtures([(shuttle::FIXTURE, SHUTTLE_DATA)])
            .multicore(true),
    )?;
    registry.register(
        WorkloadDescriptor::new("xml parsing", xml::XmlParse).with_fixtures([(xml::FIXTURE, NASA_DATA)]),
    )?;
    registry.register(
        WorkloadDescriptor::new("lzma", compress::XzCompress::default())
            .with_fixtures([(compress::FIXTURE, NASA_DATA)]),
    )?;
    registry.register(
        WorkloadDescriptor::new("sha512", hash::Sha3Digest).with_fixtures([(hash::FIXTURE, SWISSPROT_DATA)]),
    )?;
    registry.register(
        WorkloadDescriptor::new("boyer-moore/horspool", word_count::WordCount)
            .with_fixtures([
                (word_count::TEXT_FIXTURE, HAMLET_TEXT),
                (word_count::WORDS_FIXTURE, ENGLISH_WORDS),
            ])
            .multicore(true),
    )?;
    Ok(())
}

/// Convenience constructor for a registry holding the default suite.
pub fn default_registry() -> Result<WorkloadRegistry> {
    let mut registry = WorkloadRegistry::new();
    register_default_workloads(&mut registry)?;
    Ok(registry)
}
