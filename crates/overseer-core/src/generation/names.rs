//! Name generation utilities

use overseer_logic::utils::{random_choice, random_hex_pair, shuffle};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Name handed out once the pool runs dry.
pub const UNAVAILABLE_NAME: &str = "Unavailable";

/// A fixed, pre-shuffled pool of unique `/system/user/directory` paths.
///
/// The pool is built once with `side * side` entries and only shrinks, so
/// disk names are a bounded resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskNamePool {
    names: Vec<String>,
}

impl DiskNamePool {
    pub fn build(side: usize, rng: &mut impl Rng) -> Self {
        let side = side.min(SYSTEM_NAMES.len()).min(USER_NAMES.len()).min(DIRECTORY_NAMES.len());
        let systems = pick(SYSTEM_NAMES, side, rng);
        let users = pick(USER_NAMES, side, rng);
        let directories = pick(DIRECTORY_NAMES, side, rng);

        // Every (system, user) pair is distinct, so every path is too.
        let mut names = Vec::with_capacity(side * side);
        for (i, system) in systems.iter().enumerate() {
            for (j, user) in users.iter().enumerate() {
                let directory = directories[(i + j) % side];
                names.push(format!("/{system}/{user}/{directory}"));
            }
        }
        shuffle(rng, &mut names);
        Self { names }
    }

    /// Takes the next name, or [`UNAVAILABLE_NAME`] once exhausted.
    pub fn next_name(&mut self) -> String {
        self.names
            .pop()
            .unwrap_or_else(|| UNAVAILABLE_NAME.to_string())
    }

    pub fn remaining(&self) -> usize {
        self.names.len()
    }
}

fn pick(source: &[&'static str], count: usize, rng: &mut impl Rng) -> Vec<&'static str> {
    let mut items = source.to_vec();
    shuffle(rng, &mut items);
    items.truncate(count);
    items
}

/// Random file stem and extension.
pub fn generate_file_name(rng: &mut impl Rng) -> (String, String) {
    let stem = random_choice(rng, FILE_STEMS).copied().unwrap_or("data");
    let suffix = rng.gen_range(0..1000);
    let extension = random_choice(rng, FILE_EXTENSIONS).copied().unwrap_or("bin");
    (format!("{stem}_{suffix:03}"), extension.to_string())
}

/// Channel address made of `octets` colon-delimited hex pairs.
pub fn generate_channel_name(octets: usize, rng: &mut impl Rng) -> String {
    (0..octets.max(1))
        .map(|_| random_hex_pair(rng))
        .collect::<Vec<_>>()
        .join(":")
}

static SYSTEM_NAMES: &[&str] = &[
    "sys", "core", "node", "vault", "relay", "grid", "hub", "array", "nexus", "shell",
];

static USER_NAMES: &[&str] = &[
    "root", "admin", "guest", "daemon", "operator", "backup", "audit", "service", "kernel", "proxy",
];

static DIRECTORY_NAMES: &[&str] = &[
    "tmp", "var", "logs", "cache", "archive", "spool", "data", "mnt", "opt", "srv",
];

static FILE_STEMS: &[&str] = &[
    "report", "invoice", "backup", "config", "session", "payload", "ledger", "dump", "index", "manifest",
    "patch", "driver", "keyring", "journal", "export", "snapshot",
];

static FILE_EXTENSIONS: &[&str] = &[
    "txt", "log", "dat", "bin", "exe", "dll", "cfg", "zip", "db", "sys", "tmp", "pdf",
];
