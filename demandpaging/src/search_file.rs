//! Reader for the `search.txt` workload description.
//!
//! The file is a stream of whitespace-separated integers:
//!
//! | field             | count                 |
//! |-------------------|-----------------------|
//! | process count `n` | 1                     |
//! | searches `m`      | 1                     |
//! | array size `s`    | once per process      |
//! | search keys       | `m`, after each `s`   |

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};

#[derive(Debug, PartialEq, Eq)]
pub struct ProcessSpec {
    pub array_size: usize,
    pub keys: Vec<usize>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct SearchFile {
    pub searches_per_process: usize,
    pub processes: Vec<ProcessSpec>,
}

impl SearchFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("malformed {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut tokens = Tokens::new(content);

        let process_count = tokens.next("process count")?;
        let searches_per_process = tokens.next("searches per process")?;

        let mut processes = Vec::with_capacity(process_count);
        for pid in 0..process_count {
            let array_size = tokens.next(&format!("array size of process {pid}"))?;

            let keys = (0..searches_per_process)
                .map(|search| tokens.next(&format!("key {search} of process {pid}")))
                .collect::<Result<Vec<_>>>()?;

            processes.push(ProcessSpec { array_size, keys });
        }

        Ok(SearchFile {
            searches_per_process,
            processes,
        })
    }
}

struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(content: &'a str) -> Self {
        Tokens {
            inner: content.split_whitespace(),
            position: 0,
        }
    }

    fn next(&mut self, what: &str) -> Result<usize> {
        self.position += 1;

        let Some(token) = self.inner.next() else {
            bail!("unexpected end of input, expected {what} (token {})", self.position);
        };

        token
            .parse()
            .with_context(|| format!("invalid {what} {token:?} (token {})", self.position))
    }
}
