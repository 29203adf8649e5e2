use crate::anilist::MediaSearch;
use crate::error::ImportError;
use crate::mapper::{map_candidate, OutputProperties};
use crate::notion::{Publisher, RecordStore};
use crate::ranking::{rank_candidates, render_candidates};
use crate::report;
use crate::selection::{parse_selection, Selection, SelectionSource};
use crate::title::{parse_title_line, TitleLine};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

#[derive(Debug)]
pub enum LineOutcome {
    Skipped,
    Published {
        properties: OutputProperties,
        page_id: String,
    },
}

/// Reads the input list, dropping blank lines.
pub fn read_titles(path: &Path) -> Result<Vec<TitleLine>, ImportError> {
    let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ImportError::FileNotFound(path.to_path_buf()),
        _ => ImportError::ReadFailed {
            path: path.to_path_buf(),
            source,
        },
    })?;

    Ok(contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_title_line)
        .collect())
}

pub struct Importer<M, S, P> {
    search: M,
    publisher: Publisher<S>,
    prompt: P,
}

impl<M, S, P> Importer<M, S, P>
where
    M: MediaSearch,
    S: RecordStore,
    P: SelectionSource,
{
    pub fn new(search: M, publisher: Publisher<S>, prompt: P) -> Self {
        Self {
            search,
            publisher,
            prompt,
        }
    }

    /// Processes every title in the file, one at a time.
    pub fn run_file(&mut self, path: &Path) -> Result<(), ImportError> {
        let titles = match read_titles(path) {
            Ok(titles) => titles,
            Err(e) => {
                report::error(format!("Error: {}.", e));
                return Ok(());
            }
        };
        info!(count = titles.len(), path = %path.display(), "loaded titles");

        for line in &titles {
            match self.process_line(line) {
                Ok(LineOutcome::Skipped) => {}
                Ok(LineOutcome::Published { properties, page_id }) => {
                    report::success(format!(
                        "Page successfully created for '{}' ({}).",
                        properties.title, page_id
                    ));
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e @ ImportError::NoResults(_)) => report::warning(format!("{}.", e)),
                Err(e) => report::error(format!("Error: {}.", e)),
            }
        }

        Ok(())
    }

    pub fn process_line(&mut self, line: &TitleLine) -> Result<LineOutcome, ImportError> {
        println!("\nSearching for information about '{}'...", line.search_key);
        let candidates = rank_candidates(self.search.search(&line.search_key)?);

        println!("\nResults found:");
        for rendered in render_candidates(&candidates) {
            println!("{}", rendered);
        }

        let answer = self.prompt.read_choice()?;
        let selected = match parse_selection(&answer, candidates.len())? {
            Selection::Skip => return Ok(LineOutcome::Skipped),
            Selection::Pick(index) => &candidates[index],
        };

        let properties = map_candidate(selected, &line.full_title);

        println!("\nData prepared for Notion:");
        for (key, value) in properties.preview() {
            println!("{}: {}", key, value);
        }

        let page_id = self.publisher.publish(&properties)?;

        Ok(LineOutcome::Published {
            properties,
            page_id,
        })
    }

    #[cfg(test)]
    fn publisher(&self) -> &Publisher<S> {
        &self.publisher
    }
}
