use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::ir::{Forest, Person, Role, TreeError};

// Ids end up as element ids on the rendering side (`person-<id>`), so they
// must stay within a safe charset.
static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap());

#[derive(Debug, Default)]
pub struct ParseOutput {
    pub forest: Forest,
    pub warnings: Vec<ParseWarning>,
}

/// Recoverable data-contract violations. The document still parses; the
/// caller decides whether to surface these to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A spouse entry carried its own `children` array; those children are
    /// ignored for layout.
    SpouseWithChildren { id: String },
    /// A spouse entry appeared after a child entry in the same relation
    /// list; order within each group is kept as written.
    SpouseAfterChild { id: String },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::SpouseWithChildren { id } => {
                write!(f, "spouse `{id}` has children of its own; ignoring them")
            }
            ParseWarning::SpouseAfterChild { id } => {
                write!(f, "spouse `{id}` listed after a child entry")
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPerson {
    id: RawId,
    name: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    relation: String,
    generation: i32,
    #[serde(default)]
    collapsed: bool,
    #[serde(default)]
    has_more_children: bool,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    children: Vec<RawPerson>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Many(Vec<RawPerson>),
    Single(RawPerson),
}

/// Parses a family document: one root person or an array of them, each
/// owning a `children` array that mixes `type: 'spouse'` and
/// `type: 'child'` entries. Strict JSON is tried first; JS-object-literal
/// data files are accepted through json5.
pub fn parse_family(input: &str) -> Result<ParseOutput, TreeError> {
    let raw = parse_document(input)?;
    let roots = match raw {
        RawDocument::Many(list) => list,
        RawDocument::Single(person) => vec![person],
    };

    let mut output = ParseOutput::default();
    for mut raw_person in roots {
        match raw_person.kind.take().as_deref() {
            None | Some("child") => {}
            Some("spouse") => {
                let id = normalize_id(raw_person.id)?;
                return Err(TreeError::Document(format!(
                    "root person `{id}` cannot be a spouse"
                )));
            }
            Some(other) => {
                let id = normalize_id(raw_person.id)?;
                return Err(TreeError::BadRole {
                    id,
                    kind: other.to_string(),
                });
            }
        }
        let id = flatten_primary(raw_person, &mut output)?;
        output.forest.roots.push(id);
    }
    Ok(output)
}

fn parse_document(input: &str) -> Result<RawDocument, TreeError> {
    match serde_json::from_str(input) {
        Ok(raw) => Ok(raw),
        Err(_) => json5::from_str(input).map_err(|err| TreeError::Document(err.to_string())),
    }
}

fn normalize_id(raw: RawId) -> Result<String, TreeError> {
    match raw {
        RawId::Number(value) => Ok(value.to_string()),
        RawId::Text(value) => {
            if ID_RE.is_match(&value) {
                Ok(value)
            } else {
                Err(TreeError::BadId(value))
            }
        }
    }
}

fn flatten_primary(raw: RawPerson, output: &mut ParseOutput) -> Result<String, TreeError> {
    let id = normalize_id(raw.id)?;
    if output.forest.persons.contains_key(&id) {
        return Err(TreeError::DuplicateId(id));
    }

    let mut person = Person::new(id.clone(), raw.name, raw.generation, Role::Primary {
        collapsed: raw.collapsed,
        has_more_children: raw.has_more_children,
        spouses: Vec::new(),
        children: Vec::new(),
    });
    person.title = raw.title;
    person.relation = raw.relation;
    output.forest.persons.insert(id.clone(), person);

    let mut spouses = Vec::new();
    let mut children = Vec::new();
    for mut entry in raw.children {
        let kind = entry.kind.take();
        match kind.as_deref() {
            Some("spouse") => {
                let spouse_id = flatten_spouse(entry, output)?;
                if !children.is_empty() {
                    output.warnings.push(ParseWarning::SpouseAfterChild {
                        id: spouse_id.clone(),
                    });
                }
                spouses.push(spouse_id);
            }
            Some("child") | None => {
                children.push(flatten_primary(entry, output)?);
            }
            Some(other) => {
                let entry_id = normalize_id(entry.id)?;
                return Err(TreeError::BadRole {
                    id: entry_id,
                    kind: other.to_string(),
                });
            }
        }
    }

    if let Some(person) = output.forest.persons.get_mut(&id)
        && let Role::Primary {
            spouses: spouse_list,
            children: child_list,
            ..
        } = &mut person.role
    {
        *spouse_list = spouses;
        *child_list = children;
    }
    Ok(id)
}

fn flatten_spouse(raw: RawPerson, output: &mut ParseOutput) -> Result<String, TreeError> {
    let id = normalize_id(raw.id)?;
    if output.forest.persons.contains_key(&id) {
        return Err(TreeError::DuplicateId(id));
    }
    if !raw.children.is_empty() {
        output
            .warnings
            .push(ParseWarning::SpouseWithChildren { id: id.clone() });
    }
    let mut person = Person::new(id.clone(), raw.name, raw.generation, Role::Spouse);
    person.title = raw.title;
    person.relation = raw.relation;
    output.forest.persons.insert(id.clone(), person);
    Ok(id)
}
