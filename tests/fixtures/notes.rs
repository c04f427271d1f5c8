use neorepo::{repository, Entity, NeoRepository, Result, Updatable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub version: u32,
}

impl Entity for Note {
    const LABEL: &'static str = "Note";
}

impl Updatable for Note {
    fn update(&mut self) {
        self.version += 1;
    }
}

#[repository(external)]
pub trait NoteRepository: NeoRepository<Note, String> {
    #[query("MATCH (n:Note {title: $title}) RETURN n")]
    async fn find_by_title(&self, title: String) -> Result<Option<Note>>;

    #[insert]
    async fn add(&self, note: Note) -> Result<()>;

    #[update]
    async fn revise(&self, note: Note) -> Result<Note>;
}
