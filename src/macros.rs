/// A lazily compiled, process-wide `&'static Regex` for a literal pattern.
#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build an [`Attributes`](crate::Attributes) map in insertion order.
///
/// ```
/// let attrs = rulebind::attrs! { "isbn" => "123", "lang" => "en" };
/// assert_eq!(attrs.get_index(1).map(|(k, _)| k.as_str()), Some("lang"));
/// ```
#[macro_export]
macro_rules! attrs {
    () => {
        $crate::Attributes::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Attributes::new();
        $( map.insert(::std::string::String::from($key), ::std::string::String::from($value)); )+
        map
    }};
}
