//! Deterministic debug rendering of records.
//!
//! A record implements [`Describe`] by listing its fields in declaration
//! order, usually through the [`describe!`](crate::describe) macro. The
//! rendering is `Type{field:value, ...}` with zero-valued fields left out:
//!
//! ```
//! use godo_core::describe;
//!
//! struct Key {
//!     id: u64,
//!     name: String,
//!     fingerprint: String,
//! }
//!
//! describe!(godo::Key { id, name, fingerprint });
//!
//! let key = Key { id: 7, name: "deploy".into(), fingerprint: String::new() };
//! assert_eq!(key.to_string(), r#"godo::Key{id:7, name:"deploy"}"#);
//! ```

/// A value that can appear as a field in a rendered record.
pub trait Field {
    /// True for the zero value of the type (empty, zero, `None`).
    fn is_zero(&self) -> bool;

    /// Append the rendering of this value to `out`.
    fn render(&self, out: &mut String);
}

/// A record with a type name and an ordered list of fields.
pub trait Describe {
    /// Name printed before the field list.
    const TYPE_NAME: &'static str;

    /// Fields in declaration order.
    fn describe_fields(&self) -> Vec<(&'static str, &dyn Field)>;
}

/// Render `value` as `Type{field:value, ...}`.
#[must_use]
pub fn stringify<T: Describe + ?Sized>(value: &T) -> String {
    let mut out = String::new();
    write_record(value, &mut out);
    out
}

/// Append the rendering of `value` to `out`.
pub fn write_record<T: Describe + ?Sized>(value: &T, out: &mut String) {
    out.push_str(T::TYPE_NAME);
    out.push('{');

    let mut first = true;
    for (name, field) in value.describe_fields() {
        if field.is_zero() {
            continue;
        }
        if !first {
            out.push_str(", ");
        }
        first = false;
        out.push_str(name);
        out.push(':');
        field.render(out);
    }

    out.push('}');
}

impl Field for String {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn render(&self, out: &mut String) {
        out.push('"');
        out.push_str(self);
        out.push('"');
    }
}

impl Field for bool {
    fn is_zero(&self) -> bool {
        !*self
    }

    fn render(&self, out: &mut String) {
        out.push_str(if *self { "true" } else { "false" });
    }
}

macro_rules! numeric_field {
    ($($ty:ty),*) => {
        $(
            impl Field for $ty {
                #[allow(clippy::float_cmp)]
                fn is_zero(&self) -> bool {
                    *self == (0 as $ty)
                }

                fn render(&self, out: &mut String) {
                    out.push_str(&self.to_string());
                }
            }
        )*
    };
}

numeric_field!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64);

impl<T: Field> Field for Option<T> {
    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn render(&self, out: &mut String) {
        match self {
            Some(value) => value.render(out),
            None => out.push_str("<nil>"),
        }
    }
}

impl<T: Field> Field for Box<T> {
    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }

    fn render(&self, out: &mut String) {
        (**self).render(out);
    }
}

impl<T: Field> Field for Vec<T> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn render(&self, out: &mut String) {
        out.push('[');
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            item.render(out);
        }
        out.push(']');
    }
}

/// Implement [`Describe`], [`Field`] and [`Display`](std::fmt::Display) for a
/// record from its field list.
///
/// The first path segment is the prefix printed before the type name.
#[macro_export]
macro_rules! describe {
    ($prefix:ident :: $ty:ident { $($field:ident),* $(,)? }) => {
        impl $crate::stringify::Describe for $ty {
            const TYPE_NAME: &'static str = concat!(stringify!($prefix), "::", stringify!($ty));

            fn describe_fields(&self) -> ::std::vec::Vec<(&'static str, &dyn $crate::stringify::Field)> {
                ::std::vec![$((stringify!($field), &self.$field as &dyn $crate::stringify::Field)),*]
            }
        }

        impl $crate::stringify::Field for $ty {
            fn is_zero(&self) -> bool {
                false
            }

            fn render(&self, out: &mut ::std::string::String) {
                $crate::stringify::write_record(self, out);
            }
        }

        impl ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&$crate::stringify::stringify(self))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inner {
        slug: String,
    }

    struct Record {
        id: u64,
        name: String,
        locked: bool,
        tags: Vec<String>,
        ids: Vec<u32>,
        inner: Option<Inner>,
        price: f64,
    }

    crate::describe!(test::Inner { slug });
    crate::describe!(test::Record { id, name, locked, tags, ids, inner, price });

    fn record() -> Record {
        Record {
            id: 0,
            name: String::new(),
            locked: false,
            tags: Vec::new(),
            ids: Vec::new(),
            inner: None,
            price: 0.0,
        }
    }

    #[test]
    fn omits_zero_fields() {
        assert_eq!(stringify(&record()), "test::Record{}");
    }

    #[test]
    fn renders_in_declaration_order() {
        let value = Record {
            id: 123,
            name: "Key".into(),
            locked: true,
            tags: vec!["a".into(), "b".into()],
            ids: vec![1, 2, 3],
            inner: Some(Inner { slug: "nyc1".into() }),
            price: 5.5,
        };

        assert_eq!(
            value.to_string(),
            r#"test::Record{id:123, name:"Key", locked:true, tags:["a" "b"], ids:[1 2 3], inner:test::Inner{slug:"nyc1"}, price:5.5}"#
        );
    }

    #[test]
    fn nested_record_with_zero_fields_still_renders() {
        let value = Record {
            inner: Some(Inner { slug: String::new() }),
            ..record()
        };
        assert_eq!(value.to_string(), "test::Record{inner:test::Inner{}}");
    }
}
