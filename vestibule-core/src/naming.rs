//! Naming conventions shared by controllers and models.

use heck::ToUpperCamelCase;

/// Derive the model type name paired with a controller type name.
///
/// The `Controller` suffix is stripped, the remainder singularized, and a
/// trailing `controllers` module segment becomes `models`:
///
/// ```
/// use vestibule_core::model_name;
///
/// assert_eq!(model_name("app::controllers::PostsController"), "app::models::Post");
/// assert_eq!(model_name("CategoriesController"), "Category");
/// ```
pub fn model_name(controller: &str) -> String {
    let (namespace, base) = match controller.rsplit_once("::") {
        Some((namespace, base)) => (namespace, base),
        None => ("", controller),
    };
    let base = base.strip_suffix("Controller").unwrap_or(base);
    let model = singularize(base).to_upper_camel_case();

    let namespace = match namespace.rsplit_once("::") {
        Some((parent, "controllers")) => format!("{parent}::models"),
        None if namespace == "controllers" => "models".to_owned(),
        _ => namespace.to_owned(),
    };

    if namespace.is_empty() {
        model
    } else {
        format!("{namespace}::{model}")
    }
}

/// Singularize an English word using a small set of suffix rules.
pub fn singularize(word: &str) -> String {
    const RULES: &[(&str, &str)] = &[
        ("ies", "y"),
        ("sses", "ss"),
        ("shes", "sh"),
        ("ches", "ch"),
        ("xes", "x"),
        ("ss", "ss"),
        ("us", "us"),
        ("s", ""),
    ];

    RULES
        .iter()
        .find_map(|(suffix, replacement)| {
            word.strip_suffix(suffix)
                .filter(|stem| !stem.is_empty())
                .map(|stem| format!("{stem}{replacement}"))
        })
        .unwrap_or_else(|| word.to_owned())
}
