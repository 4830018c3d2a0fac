// query.rs - Multi-component joins over sparse-set arrays
//
// Joins walk the first component's dense entity list (the primary) and
// probe the remaining arrays for membership. Views borrow shared and are
// read-only; queries borrow exclusively and can hand out `&mut`
// components. Arities 1 through 6 are generated below.
//
// The component types of one join must be pairwise distinct. Mutable
// joins split the registry into per-array exclusive borrows; distinctness
// is what makes that split sound, so duplicates fail fast.

use crate::ecs::{Component, ComponentArray, ComponentRegistry, Entity};
use std::any::TypeId;

/// Component tuples that can drive a join.
pub trait QueryTuple<'w>: Sized {
    type View;
    type Query;

    fn view(registry: &'w ComponentRegistry) -> Self::View;
    fn query(registry: &'w mut ComponentRegistry) -> Self::Query;
}

impl ComponentRegistry {
    /// Read-only join; unregistered component types yield the empty join.
    pub fn view<'w, Q: QueryTuple<'w>>(&'w self) -> Q::View {
        Q::view(self)
    }

    /// Read-write join; registers missing arrays.
    pub fn query<'w, Q: QueryTuple<'w>>(&'w mut self) -> Q::Query {
        Q::query(self)
    }
}

fn assert_distinct(type_ids: &[TypeId]) {
    for i in 0..type_ids.len() {
        for j in (i + 1)..type_ids.len() {
            assert!(
                type_ids[i] != type_ids[j],
                "query component types must be pairwise distinct"
            );
        }
    }
}

/// Read-only join over a single component type.
pub struct View1<'w, A: Component> {
    a: Option<&'w ComponentArray<A>>,
}

impl<'w, A: Component> View1<'w, A> {
    pub fn for_each<Func: FnMut(Entity, &A)>(&self, func: Func) {
        if let Some(a) = self.a {
            a.for_each(func);
        }
    }

    pub fn entities(&self) -> Vec<Entity> {
        self.a.map(|a| a.entities().to_vec()).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.a.map(|a| a.len()).unwrap_or(0)
    }

    pub fn any(&self) -> bool {
        self.a.map(|a| !a.is_empty()).unwrap_or(false)
    }
}

/// Read-write join over a single component type.
pub struct Query1<'w, A: Component> {
    a: &'w mut ComponentArray<A>,
}

impl<'w, A: Component> Query1<'w, A> {
    pub fn for_each<Func: FnMut(Entity, &A)>(&self, func: Func) {
        self.a.for_each(func);
    }

    pub fn for_each_mut<Func: FnMut(Entity, &mut A)>(&mut self, func: Func) {
        self.a.for_each_mut(func);
    }

    pub fn entities(&self) -> Vec<Entity> {
        self.a.entities().to_vec()
    }

    pub fn count(&self) -> usize {
        self.a.len()
    }

    pub fn any(&self) -> bool {
        !self.a.is_empty()
    }
}

impl<'w, A: Component> QueryTuple<'w> for (A,) {
    type View = View1<'w, A>;
    type Query = Query1<'w, A>;

    fn view(registry: &'w ComponentRegistry) -> Self::View {
        View1 {
            a: registry.array_ref::<A>(),
        }
    }

    fn query(registry: &'w mut ComponentRegistry) -> Self::Query {
        Query1 {
            a: registry.array::<A>(),
        }
    }
}

macro_rules! impl_query_tuple {
    ($view:ident, $query:ident; ($head:ident, $hf:ident) $(, ($tail:ident, $tf:ident))+) => {
        /// Read-only join; the first component's array is the primary.
        pub struct $view<'w, $head: Component $(, $tail: Component)+> {
            $hf: Option<&'w ComponentArray<$head>>,
            $($tf: Option<&'w ComponentArray<$tail>>,)+
        }

        impl<'w, $head: Component $(, $tail: Component)+> $view<'w, $head $(, $tail)+> {
            pub fn for_each<Func>(&self, mut func: Func)
            where
                Func: FnMut(Entity, &$head $(, &$tail)+),
            {
                let Some($hf) = self.$hf else { return };
                $(let Some($tf) = self.$tf else { return };)+
                for (dense, &entity) in $hf.entities().iter().enumerate() {
                    $(let Some($tf) = $tf.get(entity) else { continue };)+
                    func(entity, &$hf.data()[dense] $(, $tf)+);
                }
            }

            pub fn entities(&self) -> Vec<Entity> {
                let Some($hf) = self.$hf else { return Vec::new() };
                $(let Some($tf) = self.$tf else { return Vec::new() };)+
                $hf.entities()
                    .iter()
                    .copied()
                    .filter(|&entity| true $(&& $tf.has(entity))+)
                    .collect()
            }

            pub fn count(&self) -> usize {
                let Some($hf) = self.$hf else { return 0 };
                $(let Some($tf) = self.$tf else { return 0 };)+
                $hf.entities()
                    .iter()
                    .filter(|&&entity| true $(&& $tf.has(entity))+)
                    .count()
            }

            pub fn any(&self) -> bool {
                let Some($hf) = self.$hf else { return false };
                $(let Some($tf) = self.$tf else { return false };)+
                $hf.entities()
                    .iter()
                    .any(|&entity| true $(&& $tf.has(entity))+)
            }
        }

        /// Read-write join; the first component's array is the primary.
        pub struct $query<'w, $head: Component $(, $tail: Component)+> {
            $hf: &'w mut ComponentArray<$head>,
            $($tf: &'w mut ComponentArray<$tail>,)+
        }

        impl<'w, $head: Component $(, $tail: Component)+> $query<'w, $head $(, $tail)+> {
            pub fn for_each<Func>(&self, mut func: Func)
            where
                Func: FnMut(Entity, &$head $(, &$tail)+),
            {
                for (dense, &entity) in self.$hf.entities().iter().enumerate() {
                    $(let Some($tf) = self.$tf.get(entity) else { continue };)+
                    func(entity, &self.$hf.data()[dense] $(, $tf)+);
                }
            }

            pub fn for_each_mut<Func>(&mut self, mut func: Func)
            where
                Func: FnMut(Entity, &mut $head $(, &mut $tail)+),
            {
                for dense in 0..self.$hf.len() {
                    let entity = self.$hf.entities()[dense];
                    $(let Some($tf) = self.$tf.get_mut(entity) else { continue };)+
                    func(entity, &mut self.$hf.data_mut()[dense] $(, $tf)+);
                }
            }

            pub fn entities(&self) -> Vec<Entity> {
                self.$hf
                    .entities()
                    .iter()
                    .copied()
                    .filter(|&entity| true $(&& self.$tf.has(entity))+)
                    .collect()
            }

            pub fn count(&self) -> usize {
                self.$hf
                    .entities()
                    .iter()
                    .filter(|&&entity| true $(&& self.$tf.has(entity))+)
                    .count()
            }

            pub fn any(&self) -> bool {
                self.$hf
                    .entities()
                    .iter()
                    .any(|&entity| true $(&& self.$tf.has(entity))+)
            }
        }

        impl<'w, $head: Component $(, $tail: Component)+> QueryTuple<'w>
            for ($head, $($tail),+)
        {
            type View = $view<'w, $head $(, $tail)+>;
            type Query = $query<'w, $head $(, $tail)+>;

            fn view(registry: &'w ComponentRegistry) -> Self::View {
                $view {
                    $hf: registry.array_ref::<$head>(),
                    $($tf: registry.array_ref::<$tail>(),)+
                }
            }

            fn query(registry: &'w mut ComponentRegistry) -> Self::Query {
                assert_distinct(&[
                    TypeId::of::<$head>(),
                    $(TypeId::of::<$tail>(),)+
                ]);
                // Each array is a separate heap allocation keyed by a
                // distinct TypeId, so these borrows never alias; they are
                // all tied to the registry borrow `'w`.
                unsafe {
                    $query {
                        $hf: &mut *registry.array_raw::<$head>(),
                        $($tf: &mut *registry.array_raw::<$tail>(),)+
                    }
                }
            }
        }
    };
}

impl_query_tuple!(View2, Query2; (A, a), (B, b));
impl_query_tuple!(View3, Query3; (A, a), (B, b), (C, c));
impl_query_tuple!(View4, Query4; (A, a), (B, b), (C, c), (D, d));
impl_query_tuple!(View5, Query5; (A, a), (B, b), (C, c), (D, d), (E, e));
impl_query_tuple!(View6, Query6; (A, a), (B, b), (C, c), (D, d), (E, e), (F, f));
