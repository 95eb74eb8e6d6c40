//! Dealing with PDF resources.
//!
//! A content stream refers to resources by name (`/f0`, `/x3`, …); the
//! `/Resources` dictionary of the page or XObject maps those names back to
//! indirect objects. The [`ResourceDictionaryBuilder`] hands out names while
//! a surface is being drawn and doubles as the record of which resources the
//! stream actually referenced: the finished dictionary contains exactly the
//! registered entries and nothing else.

use std::collections::HashMap;
use std::marker::PhantomData;

use pdf_writer::{writers, Dict, Finish, Name, Ref};

use crate::util::NameExt;

pub(crate) trait Resource {
    fn new(ref_: Ref) -> Self;
    fn get_ref(&self) -> Ref;
    fn get_dict<'a>(resources: &'a mut writers::Resources) -> Dict<'a>;
    fn get_prefix() -> &'static str;
    fn get_mapper(b: &mut ResourceDictionaryBuilder) -> &mut ResourceMapper<Self>;
}

macro_rules! resource {
    ($name:ident, $field:ident, $prefix:literal, $method:ident) => {
        #[derive(Debug, Eq, PartialEq, Hash, Clone)]
        pub(crate) struct $name(Ref);

        impl Resource for $name {
            fn new(ref_: Ref) -> Self {
                Self(ref_)
            }

            fn get_ref(&self) -> Ref {
                self.0
            }

            fn get_dict<'a>(resources: &'a mut writers::Resources) -> Dict<'a> {
                resources.$method()
            }

            fn get_prefix() -> &'static str {
                $prefix
            }

            fn get_mapper(b: &mut ResourceDictionaryBuilder) -> &mut ResourceMapper<$name> {
                &mut b.$field
            }
        }
    };
}

resource!(ExtGState, ext_g_states, "g", ext_g_states);
resource!(ColorSpace, color_spaces, "c", color_spaces);
resource!(Shading, shadings, "s", shadings);
resource!(XObject, x_objects, "x", x_objects);
resource!(Pattern, patterns, "p", patterns);
resource!(Font, fonts, "f", fonts);

/// Property lists (`BDC` operands). pdf-writer's resources writer has no
/// typed sub-dictionary for them, so the entry is written by name.
#[derive(Debug, Eq, PartialEq, Hash, Clone)]
pub(crate) struct Properties(Ref);

impl Resource for Properties {
    fn new(ref_: Ref) -> Self {
        Self(ref_)
    }

    fn get_ref(&self) -> Ref {
        self.0
    }

    fn get_dict<'a>(resources: &'a mut writers::Resources) -> Dict<'a> {
        resources.insert(Name(b"Properties")).dict()
    }

    fn get_prefix() -> &'static str {
        "o"
    }

    fn get_mapper(b: &mut ResourceDictionaryBuilder) -> &mut ResourceMapper<Properties> {
        &mut b.properties
    }
}

#[derive(Debug)]
pub(crate) struct ResourceDictionaryBuilder {
    pub color_spaces: ResourceMapper<ColorSpace>,
    pub ext_g_states: ResourceMapper<ExtGState>,
    pub patterns: ResourceMapper<Pattern>,
    pub x_objects: ResourceMapper<XObject>,
    pub shadings: ResourceMapper<Shading>,
    pub fonts: ResourceMapper<Font>,
    pub properties: ResourceMapper<Properties>,
}

impl ResourceDictionaryBuilder {
    pub fn new() -> Self {
        Self {
            color_spaces: ResourceMapper::new(),
            ext_g_states: ResourceMapper::new(),
            patterns: ResourceMapper::new(),
            x_objects: ResourceMapper::new(),
            shadings: ResourceMapper::new(),
            fonts: ResourceMapper::new(),
            properties: ResourceMapper::new(),
        }
    }

    pub(crate) fn register_resource<T>(&mut self, obj: T) -> String
    where
        T: Resource,
    {
        T::get_mapper(self).remap_with_name(obj.get_ref())
    }

    pub fn finish(self) -> ResourceDictionary {
        ResourceDictionary {
            color_spaces: self.color_spaces.into_resource_list(),
            ext_g_states: self.ext_g_states.into_resource_list(),
            patterns: self.patterns.into_resource_list(),
            x_objects: self.x_objects.into_resource_list(),
            shadings: self.shadings.into_resource_list(),
            fonts: self.fonts.into_resource_list(),
            properties: self.properties.into_resource_list(),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Hash, Clone, Default)]
pub(crate) struct ResourceDictionary {
    pub color_spaces: ResourceList<ColorSpace>,
    pub ext_g_states: ResourceList<ExtGState>,
    pub patterns: ResourceList<Pattern>,
    pub x_objects: ResourceList<XObject>,
    pub shadings: ResourceList<Shading>,
    pub fonts: ResourceList<Font>,
    pub properties: ResourceList<Properties>,
}

pub(crate) type ResourceNumber = u32;

impl ResourceDictionary {
    pub fn to_pdf_resources(&self, resources: &mut writers::Resources) {
        write_resource_type::<ColorSpace>(resources, &self.color_spaces);
        write_resource_type::<ExtGState>(resources, &self.ext_g_states);
        write_resource_type::<Pattern>(resources, &self.patterns);
        write_resource_type::<XObject>(resources, &self.x_objects);
        write_resource_type::<Shading>(resources, &self.shadings);
        write_resource_type::<Font>(resources, &self.fonts);
        write_resource_type::<Properties>(resources, &self.properties);
    }
}

fn write_resource_type<T>(resources: &mut writers::Resources, resource_list: &ResourceList<T>)
where
    T: Resource,
{
    if resource_list.len() > 0 {
        let mut dict = T::get_dict(resources);

        for (name, entry) in resource_list.get_entries() {
            dict.pair(name.to_pdf_name(), entry);
        }

        dict.finish();
    }
}

#[derive(Debug, Eq, PartialEq, Hash, Clone)]
pub(crate) struct ResourceList<V> {
    entries: Vec<Ref>,
    phantom: PhantomData<V>,
}

impl<V> Default for ResourceList<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            phantom: PhantomData,
        }
    }
}

impl<T> ResourceList<T>
where
    T: Resource,
{
    pub fn len(&self) -> u32 {
        self.entries.len() as u32
    }

    fn name_from_number(num: ResourceNumber) -> String {
        format!("{}{}", T::get_prefix(), num)
    }

    pub fn get_entries(&self) -> impl Iterator<Item = (String, Ref)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, r)| (Self::name_from_number(i as ResourceNumber), *r))
    }
}

#[derive(Debug, Eq, PartialEq)]
pub(crate) struct ResourceMapper<T: ?Sized> {
    forward: Vec<Ref>,
    backward: HashMap<Ref, ResourceNumber>,
    phantom: PhantomData<T>,
}

impl<T> ResourceMapper<T>
where
    T: Resource,
{
    pub fn new() -> Self {
        Self {
            forward: Vec::new(),
            backward: HashMap::new(),
            phantom: PhantomData,
        }
    }

    pub fn remap(&mut self, ref_: Ref) -> ResourceNumber {
        let forward = &mut self.forward;
        let backward = &mut self.backward;

        *backward.entry(ref_).or_insert_with(|| {
            let old = forward.len();
            forward.push(ref_);
            old as ResourceNumber
        })
    }

    pub fn remap_with_name(&mut self, ref_: Ref) -> String {
        format!("{}{}", T::get_prefix(), self.remap(ref_))
    }

    pub fn into_resource_list(self) -> ResourceList<T> {
        ResourceList {
            entries: self.forward,
            phantom: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapper_reuses_names_for_same_ref() {
        let mut b = ResourceDictionaryBuilder::new();
        let r = Ref::new(5);
        let first = b.register_resource(XObject::new(r));
        let second = b.register_resource(XObject::new(r));
        assert_eq!(first, "x0");
        assert_eq!(first, second);

        let other = b.register_resource(XObject::new(Ref::new(6)));
        assert_eq!(other, "x1");
    }

    #[test]
    fn finished_dictionary_contains_only_registered_kinds() {
        let mut b = ResourceDictionaryBuilder::new();
        b.register_resource(Font::new(Ref::new(1)));
        let dict = b.finish();
        assert_eq!(dict.fonts.len(), 1);
        assert_eq!(dict.x_objects.len(), 0);
        assert_eq!(dict.properties.len(), 0);
    }
}
