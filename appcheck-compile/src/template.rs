//! The hand-authored declaration template and its named insertion points.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use tokio::fs;

use crate::error::Error;

const EMBEDDED_TEMPLATE: &str = include_str!("../templates/declarations.d.ts");

/// A placeholder alias in the template, written as `type <Name> = {};`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Hole {
    Views,
    ViewFragments,
    Datasources,
}

impl Hole {
    pub const ALL: [Hole; 3] = [Hole::Views, Hole::ViewFragments, Hole::Datasources];

    pub fn name(self) -> &'static str {
        match self {
            Hole::Views => "Views",
            Hole::ViewFragments => "ViewFragments",
            Hole::Datasources => "Datasources",
        }
    }

    fn from_name(name: &str) -> Option<Hole> {
        Hole::ALL.iter().copied().find(|hole| hole.name() == name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Text(String),
    Hole(Hole),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclarationTemplate {
    segments: Vec<Segment>,
}

lazy_static! {
    static ref HOLE_RE: Regex = Regex::new(
        r"(?m)^[ \t]*(?:export[ \t]+)?(?:declare[ \t]+)?type[ \t]+(Views|ViewFragments|Datasources)[ \t]*=[ \t]*(\{\s*\})"
    )
    .unwrap();
}

impl DeclarationTemplate {
    /// Splits `source` around its holes, failing unless every hole appears exactly once.
    pub fn parse(source: &str) -> Result<Self, Error> {
        let mut segments = Vec::new();
        let mut found = [0usize; 3];
        let mut cursor = 0;

        for caps in HOLE_RE.captures_iter(source) {
            let hole = match Hole::from_name(&caps[1]) {
                Some(hole) => hole,
                None => continue,
            };
            let body = match caps.get(2) {
                Some(body) => body,
                None => continue,
            };

            found[hole as usize] += 1;
            segments.push(Segment::Text(source[cursor..body.start()].to_string()));
            segments.push(Segment::Hole(hole));
            cursor = body.end();
        }
        segments.push(Segment::Text(source[cursor..].to_string()));

        for hole in Hole::ALL {
            if found[hole as usize] != 1 {
                return Err(Error::TemplateHole {
                    name: hole.name(),
                    found: found[hole as usize],
                });
            }
        }

        Ok(DeclarationTemplate { segments })
    }

    /// The template shipped with appcheck.
    pub fn embedded() -> Result<Self, Error> {
        Self::parse(EMBEDDED_TEMPLATE)
    }

    pub async fn load(path: &Path) -> Result<Self, Error> {
        let source = fs::read_to_string(path)
            .await
            .map_err(|source| Error::MissingTemplate {
                path: path.to_path_buf(),
                source,
            })?;

        Self::parse(&source)
    }

    /// Renders the template with every hole replaced by `fill(hole)`.
    pub fn render(&self, mut fill: impl FnMut(Hole) -> String) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.clone(),
                Segment::Hole(hole) => fill(*hole),
            })
            .collect()
    }
}
