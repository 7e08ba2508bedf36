use crate::error::TaxonomyError;
use crate::fingerprint::calculate_config_hash;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::Path;

/// Subject → Topic → keyword phrases, in the order the source listed them.
/// Order matters: ties in classification go to the earlier (subject, topic).
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordTaxonomy {
    subjects: Vec<SubjectEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectEntry {
    pub name: String,
    pub topics: Vec<TopicEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopicEntry {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaxonomyStats {
    pub total_subjects: usize,
    pub total_topics: usize,
    pub total_keywords: usize,
}

impl KeywordTaxonomy {
    pub fn new(subjects: Vec<SubjectEntry>) -> Self {
        Self { subjects }
    }

    /// Default technical-subjects table used whenever no usable resource is given.
    pub fn builtin() -> Self {
        let subjects = BUILTIN_TAXONOMY
            .iter()
            .map(|(subject, topics)| SubjectEntry {
                name: subject.to_string(),
                topics: topics
                    .iter()
                    .map(|(topic, keywords)| TopicEntry {
                        name: topic.to_string(),
                        keywords: keywords.iter().map(|k| k.to_string()).collect(),
                    })
                    .collect(),
            })
            .collect();
        Self { subjects }
    }

    /// Load from JSON, or YAML when the extension is `.yaml`/`.yml`.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, TaxonomyError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let taxonomy: KeywordTaxonomy = if is_yaml(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        if taxonomy.stats().total_keywords == 0 {
            return Err(TaxonomyError::Empty);
        }
        Ok(taxonomy)
    }

    /// Absent, unreadable, malformed or empty resources fall back to `builtin()`.
    pub fn load_with_fallback(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::info!("📚 No taxonomy given, using built-in keywords");
            return Self::builtin();
        };

        match Self::load_from_file(path) {
            Ok(taxonomy) => {
                let stats = taxonomy.stats();
                tracing::info!(
                    "📚 Loaded taxonomy from {} ({} subjects, {} topics, {} keywords)",
                    path.display(),
                    stats.total_subjects,
                    stats.total_topics,
                    stats.total_keywords
                );
                taxonomy
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️  Failed to load taxonomy from {}: {e}, using built-in keywords",
                    path.display()
                );
                Self::builtin()
            }
        }
    }

    /// Write as pretty JSON, or YAML for `.yaml`/`.yml` paths.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), TaxonomyError> {
        let path = path.as_ref();
        let content = if is_yaml(path) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        fs::write(path, content).map_err(|source| TaxonomyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("💾 Saved taxonomy to {}", path.display());
        Ok(())
    }

    pub fn subjects(&self) -> &[SubjectEntry] {
        &self.subjects
    }

    /// Every (subject, topic) pair in taxonomy order.
    pub fn topics(&self) -> impl Iterator<Item = (&str, &TopicEntry)> + '_ {
        self.subjects.iter().flat_map(|subject| {
            subject
                .topics
                .iter()
                .map(move |topic| (subject.name.as_str(), topic))
        })
    }

    pub fn stats(&self) -> TaxonomyStats {
        TaxonomyStats {
            total_subjects: self.subjects.len(),
            total_topics: self.subjects.iter().map(|s| s.topics.len()).sum(),
            total_keywords: self.topics().map(|(_, t)| t.keywords.len()).sum(),
        }
    }

    /// SHA-256 of the canonical JSON form; equal taxonomies share it.
    pub fn fingerprint(&self) -> Result<String, TaxonomyError> {
        Ok(calculate_config_hash(self)?)
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

// ============================================================================
// ORDERED (DE)SERIALIZATION
// ============================================================================

impl Serialize for KeywordTaxonomy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.subjects.len()))?;
        for subject in &self.subjects {
            map.serialize_entry(&subject.name, &TopicsRef(&subject.topics))?;
        }
        map.end()
    }
}

struct TopicsRef<'a>(&'a [TopicEntry]);

impl Serialize for TopicsRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for topic in self.0 {
            map.serialize_entry(&topic.name, &topic.keywords)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for KeywordTaxonomy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TaxonomyVisitor;

        impl<'de> Visitor<'de> for TaxonomyVisitor {
            type Value = KeywordTaxonomy;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of subject to a map of topic to keyword list")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut subjects: Vec<SubjectEntry> = Vec::new();
                while let Some((name, OrderedTopics(topics))) =
                    access.next_entry::<String, OrderedTopics>()?
                {
                    // A repeated key replaces the earlier value in place
                    match subjects.iter_mut().find(|s| s.name == name) {
                        Some(existing) => existing.topics = topics,
                        None => subjects.push(SubjectEntry { name, topics }),
                    }
                }
                Ok(KeywordTaxonomy { subjects })
            }
        }

        deserializer.deserialize_map(TaxonomyVisitor)
    }
}

struct OrderedTopics(Vec<TopicEntry>);

impl<'de> Deserialize<'de> for OrderedTopics {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TopicsVisitor;

        impl<'de> Visitor<'de> for TopicsVisitor {
            type Value = OrderedTopics;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of topic to keyword list")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut topics: Vec<TopicEntry> = Vec::new();
                while let Some((name, keywords)) = access.next_entry::<String, Vec<String>>()? {
                    match topics.iter_mut().find(|t| t.name == name) {
                        Some(existing) => existing.keywords = keywords,
                        None => topics.push(TopicEntry { name, keywords }),
                    }
                }
                Ok(OrderedTopics(topics))
            }
        }

        deserializer.deserialize_map(TopicsVisitor)
    }
}

// ============================================================================
// BUILT-IN TAXONOMY
// ============================================================================

type TopicTable = &'static [(&'static str, &'static [&'static str])];

const BUILTIN_TAXONOMY: &[(&str, TopicTable)] = &[
    (
        "Electronics",
        &[
            (
                "Basic Electronics",
                &[
                    "resistor", "capacitor", "inductor", "diode", "transistor", "voltage",
                    "current", "ohm", "ampere", "volt", "watt", "power", "circuit", "electronic",
                    "semiconductor", "LED", "photodiode", "zener", "BJT", "FET", "MOSFET",
                    "operational amplifier", "op-amp", "rectifier", "filter", "oscillator",
                    "amplifier",
                ],
            ),
            (
                "Digital Electronics",
                &[
                    "logic gate", "AND", "OR", "NOT", "NAND", "NOR", "XOR", "flip-flop",
                    "counter", "multiplexer", "demultiplexer", "encoder", "decoder", "digital",
                    "binary", "boolean", "truth table", "logic", "combinational", "sequential",
                ],
            ),
            (
                "Communication",
                &[
                    "modulation", "demodulation", "AM", "FM", "PM", "antenna", "transmission",
                    "receiver", "frequency", "bandwidth", "signal", "noise", "SNR",
                    "communication", "radio", "microwave", "satellite", "fiber optic",
                ],
            ),
        ],
    ),
    (
        "Electrical",
        &[
            (
                "DC Circuits",
                &[
                    "DC", "direct current", "ohm's law", "kirchhoff", "series", "parallel",
                    "resistance", "conductance", "node", "mesh", "superposition", "thevenin",
                    "norton", "maximum power transfer",
                ],
            ),
            (
                "AC Circuits",
                &[
                    "AC", "alternating current", "sinusoidal", "phasor", "impedance",
                    "reactance", "capacitive", "inductive", "resonance", "power factor", "RMS",
                    "average", "reactive power", "apparent power", "real power",
                ],
            ),
            (
                "Machines",
                &[
                    "motor", "generator", "transformer", "induction", "synchronous", "DC motor",
                    "AC motor", "stepper motor", "servo motor", "torque", "speed", "efficiency",
                    "power factor", "slip", "rotor", "stator", "winding",
                ],
            ),
            (
                "Power Systems",
                &[
                    "transmission", "distribution", "protection", "relay", "circuit breaker",
                    "fuse", "earthing", "grounding", "insulation", "conductor", "cable",
                    "overhead line", "substation", "switchgear",
                ],
            ),
        ],
    ),
    (
        "Mechanical",
        &[
            (
                "Thermodynamics",
                &[
                    "heat", "temperature", "entropy", "enthalpy", "pressure", "volume",
                    "thermodynamic", "cycle", "engine", "refrigeration", "heat transfer",
                    "conduction", "convection", "radiation", "thermal",
                ],
            ),
            (
                "Fluid Mechanics",
                &[
                    "fluid", "flow", "pressure", "velocity", "viscosity", "turbulent", "laminar",
                    "bernoulli", "continuity", "pump", "turbine", "pipe", "flow rate",
                ],
            ),
            (
                "Mechanics",
                &[
                    "force", "moment", "torque", "stress", "strain", "beam", "truss", "material",
                    "strength", "elastic", "plastic", "deformation", "mechanics", "statics",
                    "dynamics", "kinematics",
                ],
            ),
        ],
    ),
    (
        "Computer Science",
        &[
            (
                "Programming",
                &[
                    "algorithm", "data structure", "programming", "code", "function",
                    "variable", "loop", "condition", "array", "pointer", "object", "class",
                    "method", "inheritance", "polymorphism",
                ],
            ),
            (
                "Database",
                &[
                    "database", "SQL", "table", "query", "join", "index", "normalization",
                    "primary key", "foreign key", "relationship", "RDBMS", "transaction",
                ],
            ),
            (
                "Networks",
                &[
                    "network", "protocol", "TCP", "IP", "HTTP", "FTP", "router", "switch", "hub",
                    "LAN", "WAN", "ethernet", "wireless", "OSI", "packet",
                ],
            ),
        ],
    ),
    (
        "Mathematics",
        &[
            (
                "Algebra",
                &[
                    "equation", "polynomial", "matrix", "determinant", "eigenvalue", "vector",
                    "linear", "quadratic", "algebraic", "coefficient", "variable", "constant",
                ],
            ),
            (
                "Calculus",
                &[
                    "derivative", "integral", "limit", "continuity", "differentiation",
                    "integration", "partial", "differential", "calculus", "function",
                ],
            ),
            (
                "Statistics",
                &[
                    "probability", "statistics", "mean", "median", "mode", "variance",
                    "standard deviation", "distribution", "normal", "binomial", "poisson",
                ],
            ),
        ],
    ),
    (
        "Physics",
        &[
            (
                "Classical Mechanics",
                &[
                    "motion", "velocity", "acceleration", "momentum", "energy", "work", "power",
                    "friction", "gravity", "newton", "mechanics", "kinematics", "dynamics",
                    "oscillation", "wave",
                ],
            ),
            (
                "Electromagnetism",
                &[
                    "electric field", "magnetic field", "electromagnetic", "maxwell", "gauss",
                    "faraday", "lenz", "electromagnetic induction", "flux",
                ],
            ),
            (
                "Modern Physics",
                &[
                    "quantum", "relativity", "photon", "electron", "atom", "nucleus",
                    "radioactivity", "particle", "wave-particle duality", "uncertainty",
                ],
            ),
        ],
    ),
];
