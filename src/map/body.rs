use crate::geom::DVec3;
use crate::map::error::{DocumentError, MalformedBody, MalformedReason};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    Star,
    Planet,
    Moon,
    Starbase,
    Fleet,
    /// Any `type` the map does not recognise.
    Unknown,
}

impl BodyKind {
    pub const KNOWN: [BodyKind; 5] = [
        BodyKind::Star,
        BodyKind::Planet,
        BodyKind::Moon,
        BodyKind::Starbase,
        BodyKind::Fleet,
    ];

    pub const ALL: [BodyKind; 6] = [
        BodyKind::Star,
        BodyKind::Planet,
        BodyKind::Moon,
        BodyKind::Starbase,
        BodyKind::Fleet,
        BodyKind::Unknown,
    ];

    pub fn from_type(raw: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|kind| raw.eq_ignore_ascii_case(kind.label()))
            .unwrap_or(BodyKind::Unknown)
    }

    pub fn from_filter_name(name: &str) -> Option<Self> {
        let singular = name.strip_suffix('s').unwrap_or(name);
        Self::ALL.into_iter().find(|kind| {
            name.eq_ignore_ascii_case(kind.label()) || singular.eq_ignore_ascii_case(kind.label())
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            BodyKind::Star => "star",
            BodyKind::Planet => "planet",
            BodyKind::Moon => "moon",
            BodyKind::Starbase => "starbase",
            BodyKind::Fleet => "fleet",
            BodyKind::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub id: String,
    pub name: String,
    pub kind: BodyKind,
    pub position: DVec3,
    pub radius: Option<f64>,
    pub gravity: Option<f64>,
    pub children: Vec<Body>,
}

impl Body {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn iter(&self) -> BodyIter<'_> {
        BodyIter { stack: vec![self] }
    }

    pub fn descendant_count(&self) -> usize {
        self.iter().count() - 1
    }
}

pub struct BodyIter<'a> {
    stack: Vec<&'a Body>,
}

impl<'a> Iterator for BodyIter<'a> {
    type Item = &'a Body;

    fn next(&mut self) -> Option<&'a Body> {
        let body = self.stack.pop()?;
        self.stack.extend(body.children.iter().rev());
        Some(body)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SystemMap {
    roots: Vec<Body>,
    // Child-index path from the roots to each body.
    index: HashMap<String, Vec<usize>>,
    rejected: Vec<MalformedBody>,
}

impl PartialEq for SystemMap {
    fn eq(&self, other: &Self) -> bool {
        self.roots == other.roots
    }
}

impl SystemMap {
    pub fn from_json(json: &str, scale: f64) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(json)?;
        Self::parse(&value, scale)
    }

    pub fn parse(value: &Value, scale: f64) -> Result<Self, DocumentError> {
        let mut parser = Parser {
            scale,
            seen: HashSet::new(),
            rejected: Vec::new(),
        };

        let roots = match value {
            Value::Object(map) if looks_like_body(map) => parser.collect([("", value)]),
            Value::Object(map) => {
                parser.collect(map.iter().map(|(key, child)| (key.as_str(), child)))
            }
            Value::Array(items) => {
                let keys: Vec<String> = (0..items.len()).map(|i| i.to_string()).collect();
                parser.collect(keys.iter().map(String::as_str).zip(items.iter()))
            }
            _ => return Err(DocumentError::NotAnObject),
        };

        let Parser { rejected, .. } = parser;
        if roots.is_empty() {
            return Err(DocumentError::Empty { rejected });
        }

        let mut index = HashMap::new();
        for (i, root) in roots.iter().enumerate() {
            index_paths(root, &mut vec![i], &mut index);
        }

        Ok(Self {
            roots,
            index,
            rejected,
        })
    }

    pub fn roots(&self) -> &[Body] {
        &self.roots
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> + '_ {
        self.roots.iter().flat_map(Body::iter)
    }

    pub fn get(&self, id: &str) -> Option<&Body> {
        let path = self.index.get(id)?;
        let (first, rest) = path.split_first()?;
        let mut body = self.roots.get(*first)?;
        for &i in rest {
            body = body.children.get(i)?;
        }
        Some(body)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn rejected(&self) -> &[MalformedBody] {
        &self.rejected
    }
}

fn looks_like_body(map: &Map<String, Value>) -> bool {
    map.contains_key("center") || map.contains_key("type")
}

fn index_paths(body: &Body, path: &mut Vec<usize>, index: &mut HashMap<String, Vec<usize>>) {
    index.insert(body.id.clone(), path.clone());
    for (i, child) in body.children.iter().enumerate() {
        path.push(i);
        index_paths(child, path, index);
        path.pop();
    }
}

struct Parser {
    scale: f64,
    seen: HashSet<String>,
    rejected: Vec<MalformedBody>,
}

impl Parser {
    fn collect<'v>(&mut self, entries: impl IntoIterator<Item = (&'v str, &'v Value)>) -> Vec<Body> {
        self.collect_at("", entries)
    }

    fn collect_at<'v>(
        &mut self,
        base: &str,
        entries: impl IntoIterator<Item = (&'v str, &'v Value)>,
    ) -> Vec<Body> {
        let mut bodies = Vec::new();
        for (key, value) in entries {
            let path = if key.is_empty() {
                base.to_string()
            } else {
                format!("{base}/{key}")
            };
            match self.body(value, &path) {
                Ok(body) => bodies.push(body),
                Err(err) => {
                    log::warn!("{err}");
                    self.rejected.push(err);
                }
            }
        }
        bodies
    }

    fn body(&mut self, value: &Value, path: &str) -> Result<Body, MalformedBody> {
        let malformed = |reason| MalformedBody {
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            reason,
        };

        let obj = value
            .as_object()
            .ok_or_else(|| malformed(MalformedReason::NotAnObject))?;

        let id = read_id(obj).map_err(malformed)?;
        let name = read_str(obj, "name").map_err(malformed)?;
        let raw_type = read_str(obj, "type").map_err(malformed)?;
        let center = read_center(obj).map_err(malformed)?;
        let radius = read_opt_number(obj, "radius").map_err(malformed)?;
        let gravity = read_opt_number(obj, "gravity").map_err(malformed)?;
        let (children_key, children_value) = read_children(obj).map_err(malformed)?;

        if self.seen.contains(&id) {
            return Err(malformed(MalformedReason::DuplicateId(id)));
        }
        self.seen.insert(id.clone());

        let kind = BodyKind::from_type(&raw_type);
        if kind == BodyKind::Unknown {
            log::warn!("body `{id}` has unrecognised type `{raw_type}`");
        }

        let child_base = format!("{path}/{children_key}");
        let children = match children_value {
            Some(Value::Array(items)) => {
                let keys: Vec<String> = (0..items.len()).map(|i| i.to_string()).collect();
                self.collect_at(&child_base, keys.iter().map(String::as_str).zip(items.iter()))
            }
            Some(Value::Object(map)) => self.collect_at(
                &child_base,
                map.iter().map(|(key, child)| (key.as_str(), child)),
            ),
            _ => Vec::new(),
        };

        Ok(Body {
            id,
            name,
            kind,
            position: center / self.scale,
            radius,
            gravity,
            children,
        })
    }
}

fn present<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|value| !value.is_null())
}

fn read_id(obj: &Map<String, Value>) -> Result<String, MalformedReason> {
    let field = if present(obj, "bodyId").is_some() { "bodyId" } else { "id" };
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        None | Some(Value::Null) => Err(MalformedReason::MissingField("id")),
        Some(_) => Err(MalformedReason::WrongType {
            field,
            expected: "a string or number",
        }),
    }
}

fn read_str(obj: &Map<String, Value>, field: &'static str) -> Result<String, MalformedReason> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        None | Some(Value::Null) => Err(MalformedReason::MissingField(field)),
        Some(_) => Err(MalformedReason::WrongType {
            field,
            expected: "a string",
        }),
    }
}

fn read_center(obj: &Map<String, Value>) -> Result<DVec3, MalformedReason> {
    let center = match obj.get("center") {
        None | Some(Value::Null) => return Err(MalformedReason::MissingCenter),
        Some(Value::Object(center)) => center,
        Some(_) => {
            return Err(MalformedReason::WrongType {
                field: "center",
                expected: "an object",
            })
        }
    };
    let axis = |name: &'static str| {
        center
            .get(name)
            .and_then(Value::as_f64)
            .ok_or(MalformedReason::BadCoordinate(name))
    };
    Ok(DVec3::new(axis("x")?, axis("y")?, axis("z")?))
}

fn read_opt_number(
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<f64>, MalformedReason> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_f64().map(Some).ok_or(MalformedReason::WrongType {
            field,
            expected: "a number",
        }),
    }
}

fn read_children(
    obj: &Map<String, Value>,
) -> Result<(&'static str, Option<&Value>), MalformedReason> {
    let field = if present(obj, "children").is_some() { "children" } else { "bodies" };
    match obj.get(field) {
        None | Some(Value::Null) => Ok((field, None)),
        Some(value @ (Value::Array(_) | Value::Object(_))) => Ok((field, Some(value))),
        Some(_) => Err(MalformedReason::WrongType {
            field,
            expected: "an array or object",
        }),
    }
}
