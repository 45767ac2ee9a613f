use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("unknown person id `{0}`")]
    UnknownId(String),
    #[error("person `{0}` is a spouse and cannot be collapsed")]
    NotAPrimary(String),
    #[error("duplicate person id `{0}`")]
    DuplicateId(String),
    #[error("cycle detected at person id `{0}`")]
    CycleDetected(String),
    #[error("invalid person id `{0}`")]
    BadId(String),
    #[error("unknown relation type `{kind}` on person `{id}`")]
    BadRole { id: String, kind: String },
    #[error("malformed family document: {0}")]
    Document(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// Closed role discriminant. Spouses carry no descendant state at all, so
/// the spouse-has-no-children contract holds by construction.
#[derive(Debug, Clone)]
pub enum Role {
    Primary {
        collapsed: bool,
        has_more_children: bool,
        spouses: Vec<String>,
        children: Vec<String>,
    },
    Spouse,
}

impl Role {
    pub fn primary() -> Self {
        Role::Primary {
            collapsed: false,
            has_more_children: false,
            spouses: Vec::new(),
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub title: String,
    pub relation: String,
    pub generation: i32,
    pub role: Role,
    // Written exclusively by the layout engine. Hidden persons keep the
    // coordinates of the last run they were visible in.
    pub position: Position,
    pub hidden_by_collapse: bool,
}

impl Person {
    pub fn new(id: impl Into<String>, name: impl Into<String>, generation: i32, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: String::new(),
            relation: String::new(),
            generation,
            role,
            position: Position::default(),
            hidden_by_collapse: false,
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self.role, Role::Primary { .. })
    }

    pub fn collapsed(&self) -> bool {
        match &self.role {
            Role::Primary { collapsed, .. } => *collapsed,
            Role::Spouse => false,
        }
    }

    pub fn has_more_children(&self) -> bool {
        match &self.role {
            Role::Primary {
                has_more_children, ..
            } => *has_more_children,
            Role::Spouse => false,
        }
    }

    pub fn spouses(&self) -> &[String] {
        match &self.role {
            Role::Primary { spouses, .. } => spouses,
            Role::Spouse => &[],
        }
    }

    pub fn children(&self) -> &[String] {
        match &self.role {
            Role::Primary { children, .. } => children,
            Role::Spouse => &[],
        }
    }
}

/// The whole family forest: a flat id-keyed table plus the ordered root
/// list. Relations are id references; sibling and spouse order is display
/// order and is preserved through every pipeline stage.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    pub persons: BTreeMap<String, Person>,
    pub roots: Vec<String>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Person> {
        self.persons.get(id)
    }

    pub fn children_of(&self, id: &str) -> &[String] {
        self.persons.get(id).map(|p| p.children()).unwrap_or(&[])
    }

    pub fn spouses_of(&self, id: &str) -> &[String] {
        self.persons.get(id).map(|p| p.spouses()).unwrap_or(&[])
    }

    pub fn is_primary(&self, id: &str) -> bool {
        self.persons.get(id).map(Person::is_primary).unwrap_or(false)
    }

    pub fn generation_of(&self, id: &str) -> Option<i32> {
        self.persons.get(id).map(|person| person.generation)
    }

    /// Smallest and largest generation present, derived on demand. The
    /// engine never assumes roots start at any particular number.
    pub fn generation_range(&self) -> Option<(i32, i32)> {
        let mut range: Option<(i32, i32)> = None;
        for person in self.persons.values() {
            range = Some(match range {
                None => (person.generation, person.generation),
                Some((min, max)) => (min.min(person.generation), max.max(person.generation)),
            });
        }
        range
    }

    /// Toggles collapse on a primary node. Callers must re-run the layout
    /// pipeline before reading positions or visibility again.
    pub fn set_collapsed(&mut self, id: &str, collapsed: bool) -> Result<(), TreeError> {
        let person = self
            .persons
            .get_mut(id)
            .ok_or_else(|| TreeError::UnknownId(id.to_string()))?;
        match &mut person.role {
            Role::Primary {
                collapsed: flag, ..
            } => {
                *flag = collapsed;
                Ok(())
            }
            Role::Spouse => Err(TreeError::NotAPrimary(id.to_string())),
        }
    }

    /// Splices a lazily fetched subtree under `parent_id`: the subtree's
    /// roots become additional spouses/children of the parent (in subtree
    /// root order), and `has_more_children` is cleared. Every id in the
    /// subtree must be new to this forest, which also rules out splicing a
    /// node underneath itself.
    pub fn insert_subtree(&mut self, parent_id: &str, subtree: Forest) -> Result<(), TreeError> {
        match self.persons.get(parent_id) {
            None => return Err(TreeError::UnknownId(parent_id.to_string())),
            Some(person) if !person.is_primary() => {
                return Err(TreeError::NotAPrimary(parent_id.to_string()));
            }
            Some(_) => {}
        }
        for id in subtree.persons.keys() {
            if self.persons.contains_key(id) {
                return Err(TreeError::DuplicateId(id.clone()));
            }
        }

        let Forest { persons, roots } = subtree;
        let mut new_spouses = Vec::new();
        let mut new_children = Vec::new();
        for root_id in &roots {
            match persons.get(root_id) {
                Some(person) if person.is_primary() => new_children.push(root_id.clone()),
                Some(_) => new_spouses.push(root_id.clone()),
                None => return Err(TreeError::UnknownId(root_id.clone())),
            }
        }
        self.persons.extend(persons);

        let parent = self
            .persons
            .get_mut(parent_id)
            .expect("parent checked above");
        if let Role::Primary {
            has_more_children,
            spouses,
            children,
            ..
        } = &mut parent.role
        {
            spouses.extend(new_spouses);
            children.extend(new_children);
            *has_more_children = false;
        }
        Ok(())
    }
}
