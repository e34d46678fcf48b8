//! Struct field queries.
//!
//! Name lookup follows embedding: fields of embedded structs (and of
//! structs behind embedded pointers) are visible from the outer struct
//! unless a shallower field of the same name shadows them. Two matches at
//! the same depth cancel out.

use reflex_ir::{Kind, StructTag};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::{smallvec, SmallVec};

use crate::desc::Type;

/// Index path from a struct to a (possibly promoted) field.
pub type FieldIndex = SmallVec<[usize; 4]>;

/// A struct field as reported by field queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    /// Package of an unexported field, `""` for exported ones.
    pub pkg_path: String,
    pub typ: Type,
    pub tag: StructTag,
    /// Byte offset within the struct that declares the field.
    pub offset: usize,
    pub index: FieldIndex,
    pub embedded: bool,
}

impl Field {
    pub fn is_exported(&self) -> bool {
        self.pkg_path.is_empty()
    }
}

impl Type {
    /// Field `i` of a struct type.
    ///
    /// # Panics
    ///
    /// If this is not a struct type or `i` is out of range.
    #[track_caller]
    pub fn field(self, i: usize) -> Field {
        let fields = self.fields();
        let Some(f) = fields.get(i) else {
            panic!("reflex: Field index {i} out of range for {self}");
        };
        let pkg_path = if f.name.is_exported() {
            String::new()
        } else {
            self.member_pkg_path().unwrap_or_default().to_owned()
        };
        Field {
            name: f.name().to_owned(),
            pkg_path,
            typ: f.typ,
            tag: StructTag::new(f.tag()),
            offset: f.offset,
            index: smallvec![i],
            embedded: f.embedded,
        }
    }

    /// The nested field reached by following `index`, stepping through
    /// embedded pointers to structs.
    ///
    /// # Panics
    ///
    /// If the path leaves struct types or an index is out of range.
    #[track_caller]
    pub fn field_by_index(self, index: &[usize]) -> Field {
        let mut t = self;
        let mut field: Option<Field> = None;
        for &i in index {
            if let Some(prev) = &field {
                t = prev.typ;
                if t.kind == Kind::Pointer && t.elem().kind == Kind::Struct {
                    t = t.elem();
                }
            }
            field = Some(t.field(i));
        }
        match field {
            Some(mut f) => {
                f.index = index.into();
                f
            }
            None => panic!("reflex: FieldByIndex with empty index on {self}"),
        }
    }

    /// The field called `name`, searching embedded structs breadth first.
    pub fn field_by_name(self, name: &str) -> Option<Field> {
        let mut has_embeds = false;
        if !name.is_empty() {
            for (i, f) in self.fields().iter().enumerate() {
                if f.name() == name {
                    return Some(self.field(i));
                }
                has_embeds |= f.embedded;
            }
        }
        if !has_embeds {
            return None;
        }
        self.field_by_name_func(|s| s == name)
    }

    /// The shallowest field whose name satisfies `matches`. `None` if there
    /// is no such field or the shallowest depth holds more than one.
    pub fn field_by_name_func(self, mut matches: impl FnMut(&str) -> bool) -> Option<Field> {
        struct Scan {
            typ: Type,
            index: FieldIndex,
        }

        let mut current: Vec<Scan> = Vec::new();
        let mut next = vec![Scan {
            typ: self,
            index: FieldIndex::new(),
        }];
        // Embedded struct types seen at the next depth, and how often
        // (capped at 2). A type reached twice annihilates its matches.
        let mut next_count: FxHashMap<Type, u8> = FxHashMap::default();
        let mut visited: FxHashSet<Type> = FxHashSet::default();
        let mut result: Option<Field> = None;

        while !next.is_empty() {
            std::mem::swap(&mut current, &mut next);
            next.clear();
            let count = std::mem::take(&mut next_count);

            for scan in &current {
                let t = scan.typ;
                if !visited.insert(t) {
                    // Seen at a shallower depth, which shadows this one.
                    continue;
                }
                let t_count = count.get(&t).copied().unwrap_or(0);
                for (i, f) in t.fields().iter().enumerate() {
                    let ntyp = f.embedded.then(|| {
                        if f.typ.kind == Kind::Pointer {
                            f.typ.elem()
                        } else {
                            f.typ
                        }
                    });

                    if matches(f.name()) {
                        if t_count > 1 || result.is_some() {
                            return None;
                        }
                        let mut found = t.field(i);
                        let mut index = scan.index.clone();
                        index.push(i);
                        found.index = index;
                        result = Some(found);
                        continue;
                    }

                    let Some(ntyp) = ntyp else {
                        continue;
                    };
                    if result.is_some() || ntyp.kind != Kind::Struct {
                        continue;
                    }
                    let c = next_count.entry(ntyp).or_insert(0);
                    if *c > 0 {
                        *c = 2;
                        continue;
                    }
                    *c = if t_count > 1 { 2 } else { 1 };
                    let mut index = scan.index.clone();
                    index.push(i);
                    next.push(Scan { typ: ntyp, index });
                }
            }
            if result.is_some() {
                break;
            }
        }
        result
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
