//! Rule sets for every request body and query string the API accepts

use once_cell::sync::Lazy;

use super::rules::{Check, FieldRule, RuleSet, SizeLimit, Transform};

pub const COLLABORATOR_ROLES: &[&str] = &["viewer", "editor", "admin"];

const AXES: [&str; 3] = ["x", "y", "z"];
const TRANSFORM_PARTS: [&str; 3] = ["position", "rotation", "scale"];

fn id_field(path: &str, label: &str) -> FieldRule {
    FieldRule::new(path)
        .trim()
        .required(format!("{} is required", label))
        .check(Check::DocumentId, format!("{} is invalid", label))
}

fn email_field(path: &str) -> FieldRule {
    FieldRule::new(path)
        .transform(Transform::NormalizeEmail)
        .required("Email is required")
        .check(Check::Email, "Please provide a valid email")
}

fn new_password_field(path: &str) -> FieldRule {
    FieldRule::new(path)
        .required("Password is required")
        .length(6, 128, "Password must be between 6 and 128 characters")
}

fn display_name(optional: bool) -> FieldRule {
    let rule = if optional {
        FieldRule::optional("displayName")
    } else {
        FieldRule::new("displayName").required("Display name is required")
    };
    rule.trim()
        .length(2, 50, "Display name must be between 2 and 50 characters")
        .sanitize()
}

fn safe_url_field(path: &str, label: &str) -> FieldRule {
    FieldRule::optional(path)
        .trim()
        .check(Check::SafeUrl, format!("{} must be a valid http(s) URL", label))
}

fn tags_field(max_items: usize) -> FieldRule {
    FieldRule::optional("tags")
        .check(
            Check::Array {
                min_items: 0,
                max_items,
            },
            format!("Tags must be an array of at most {} items", max_items),
        )
        .transform(Transform::SanitizeArray)
}

/// Shape and bounds rules for `position`/`rotation`/`scale` under `prefix`
fn transform_rules(prefix: &str) -> Vec<FieldRule> {
    let mut rules = Vec::new();
    for part in TRANSFORM_PARTS {
        let path = if prefix.is_empty() {
            part.to_string()
        } else {
            format!("{}.{}", prefix, part)
        };
        rules.push(
            FieldRule::optional(path.clone())
                .check(Check::Object, format!("{} must be an object", part)),
        );
        for axis in AXES {
            rules.push(FieldRule::optional(format!("{}.{}", path, axis)).check(
                Check::Coordinate,
                format!(
                    "{}.{} must be a number between -1000000 and 1000000",
                    part, axis
                ),
            ));
        }
    }
    rules
}

fn project_fields(create: bool) -> Vec<FieldRule> {
    let name = if create {
        FieldRule::new("name").trim().required("Project name is required")
    } else {
        FieldRule::optional("name").trim()
    };

    vec![
        name.length(3, 100, "Project name must be between 3 and 100 characters")
            .sanitize(),
        FieldRule::optional("description")
            .trim()
            .length(0, 1000, "Description must be at most 1000 characters")
            .sanitize(),
        FieldRule::optional("roomType")
            .trim()
            .length(0, 50, "Room type must be at most 50 characters")
            .sanitize(),
        tags_field(10),
        FieldRule::optional("isPublic").check(Check::Boolean, "isPublic must be a boolean"),
    ]
}

fn design_fields(create: bool) -> Vec<FieldRule> {
    let mut rules = Vec::new();
    if create {
        rules.push(id_field("projectId", "Project ID"));
        rules.push(
            FieldRule::new("name")
                .trim()
                .required("Design name is required")
                .length(3, 100, "Design name must be between 3 and 100 characters")
                .sanitize(),
        );
    } else {
        rules.push(
            FieldRule::optional("name")
                .trim()
                .length(3, 100, "Design name must be between 3 and 100 characters")
                .sanitize(),
        );
    }

    rules.push(
        FieldRule::optional("canvasData")
            .check(Check::Object, "Canvas data must be an object")
            .check(
                Check::MaxSize(SizeLimit::Canvas),
                "Canvas data is too large",
            )
            .transform(Transform::SanitizeObject),
    );
    rules.push(
        FieldRule::optional("objects")
            .check(
                Check::Array {
                    min_items: 0,
                    max_items: 200,
                },
                "Objects must be an array of at most 200 items",
            )
            .transform(Transform::SanitizeObject),
    );
    rules.extend(transform_rules("objects.*"));
    rules.push(safe_url_field("imageUrl", "Image URL"));
    rules
}

pub static USER_SIGNUP: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new("user.signup")
        .field(email_field("email"))
        .field(new_password_field("password"))
        .field(display_name(false))
});

pub static USER_LOGIN: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new("user.login")
        .field(email_field("email"))
        .field(FieldRule::new("password").required("Password is required"))
});

pub static USER_FORGOT_PASSWORD: Lazy<RuleSet> =
    Lazy::new(|| RuleSet::new("user.forgotPassword").field(email_field("email")));

pub static USER_RESET_PASSWORD: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new("user.resetPassword")
        .field(
            FieldRule::new("oobCode")
                .trim()
                .required("Reset code is required"),
        )
        .field(new_password_field("newPassword"))
});

pub static USER_CHANGE_PASSWORD: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new("user.changePassword").field(new_password_field("newPassword"))
});

pub static USER_UPDATE_PROFILE: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new("user.updateProfile")
        .field(display_name(true))
        .field(safe_url_field("profileImageUrl", "Profile image URL"))
        .field(
            FieldRule::optional("phoneNumber")
                .trim()
                .check(Check::Phone, "Please provide a valid phone number"),
        )
        .field(
            FieldRule::optional("preferences")
                .check(Check::Object, "Preferences must be an object")
                .check(Check::MaxSize(SizeLimit::Field), "Preferences is too large")
                .transform(Transform::SanitizeObject),
        )
});

pub static USER_UPDATE_PREFERENCES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new("user.updatePreferences").field(
        FieldRule::new("")
            .check(Check::Object, "Preferences must be an object")
            .check(Check::MaxSize(SizeLimit::Field), "Preferences is too large")
            .transform(Transform::SanitizeObject),
    )
});

pub static USER_UPDATE_PREFERENCE: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new("user.updatePreference")
        .field(
            FieldRule::new("key")
                .trim()
                .required("Preference key is required")
                .length(1, 100, "Preference key must be between 1 and 100 characters")
                .sanitize(),
        )
        .field(
            FieldRule::optional("value")
                .check(Check::MaxSize(SizeLimit::Field), "Preference value is too large")
                .transform(Transform::SanitizeObject),
        )
});

pub static USER_BATCH: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new("user.batch").field(
        FieldRule::new("userIds")
            .required("User IDs are required")
            .check(
                Check::Array {
                    min_items: 1,
                    max_items: 10,
                },
                "userIds must be an array of 1 to 10 items",
            )
            .check(Check::StringItems, "userIds must contain only strings"),
    )
});

pub static USER_SEARCH: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new("user.search")
        .field(
            FieldRule::new("query")
                .trim()
                .required("Search query is required")
                .length(2, 100, "Search query must be at least 2 characters")
                .sanitize(),
        )
        .field(
            FieldRule::optional("limit")
                .transform(Transform::ToNumber)
                .check(
                    Check::Number {
                        min: Some(1.0),
                        max: Some(50.0),
                    },
                    "Limit must be between 1 and 50",
                ),
        )
});

pub static USER_BY_EMAIL: Lazy<RuleSet> =
    Lazy::new(|| RuleSet::new("user.byEmail").field(email_field("email")));

pub static PROJECT_CREATE: Lazy<RuleSet> =
    Lazy::new(|| RuleSet::new("project.create").fields(project_fields(true)));

pub static PROJECT_UPDATE: Lazy<RuleSet> =
    Lazy::new(|| RuleSet::new("project.update").fields(project_fields(false)));

pub static PROJECT_ADD_ITEM: Lazy<RuleSet> =
    Lazy::new(|| RuleSet::new("project.addItem").field(id_field("itemId", "Item ID")));

pub static COLLABORATION_SHARE: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new("collaboration.share")
        .field(email_field("email"))
        .field(FieldRule::optional("role").trim().check(
            Check::OneOf(COLLABORATOR_ROLES),
            "Role must be viewer, editor, or admin",
        ))
});

pub static DESIGN_CREATE: Lazy<RuleSet> =
    Lazy::new(|| RuleSet::new("design.create").fields(design_fields(true)));

pub static DESIGN_UPDATE: Lazy<RuleSet> =
    Lazy::new(|| RuleSet::new("design.update").fields(design_fields(false)));

pub static DESIGN_OBJECT_ADD: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new("designObject.add")
        .field(id_field("furnitureItemId", "Furniture item ID"))
        .fields(transform_rules(""))
});

pub static DESIGN_OBJECT_UPDATE: Lazy<RuleSet> =
    Lazy::new(|| RuleSet::new("designObject.update").fields(transform_rules("")));

pub static FURNITURE_CREATE: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new("furniture.create")
        .field(
            FieldRule::new("name")
                .trim()
                .required("Furniture name is required")
                .length(3, 100, "Name must be between 3 and 100 characters")
                .sanitize(),
        )
        .field(
            FieldRule::new("description")
                .trim()
                .required("Description is required")
                .length(10, 1000, "Description must be between 10 and 1000 characters")
                .sanitize(),
        )
        .field(
            FieldRule::new("category")
                .trim()
                .required("Category is required")
                .sanitize(),
        )
        .field(FieldRule::optional("roomType").trim().sanitize())
        .field(FieldRule::new("price").check(
            Check::Number {
                min: Some(0.0),
                max: None,
            },
            "Price must be a positive number",
        ))
        .field(tags_field(20))
        .field(FieldRule::optional("featured").check(Check::Boolean, "featured must be a boolean"))
        .field(safe_url_field("modelUrl", "Model URL"))
        .field(safe_url_field("thumbnailUrl", "Thumbnail URL"))
});

pub static FURNITURE_SEARCH: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new("furniture.search").field(
        FieldRule::new("q")
            .trim()
            .required("Search query is required")
            .length(2, 100, "Search query must be between 2 and 100 characters")
            .sanitize(),
    )
});

pub static FURNITURE_LIST: Lazy<RuleSet> = Lazy::new(|| {
    let price = |path: &str, label: &str| {
        FieldRule::optional(path)
            .transform(Transform::ToNumber)
            .check(
                Check::Number {
                    min: Some(0.0),
                    max: None,
                },
                format!("{} must be a positive number", label),
            )
    };

    RuleSet::new("furniture.list")
        .field(FieldRule::optional("category").trim().sanitize())
        .field(FieldRule::optional("roomType").trim().sanitize())
        .field(price("minPrice", "minPrice"))
        .field(price("maxPrice", "maxPrice"))
});

pub static FAVORITE_ADD: Lazy<RuleSet> =
    Lazy::new(|| RuleSet::new("favorite.add").field(id_field("itemId", "Item ID")));

pub static FURNITURE_TRACK_VIEW: Lazy<RuleSet> =
    Lazy::new(|| RuleSet::new("furniture.trackView").field(id_field("itemId", "Item ID")));

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::middleware::input_sanitization::config::SanitizationConfig;
    use serde_json::json;

    fn fields(err: &crate::api::middleware::validation::ValidationErrors) -> Vec<String> {
        err.errors().iter().map(|e| e.field.clone()).collect()
    }

    #[test]
    fn test_project_name_too_short_is_rejected() {
        let err = PROJECT_CREATE
            .evaluate(&json!({"name": "ab"}), &SanitizationConfig::default())
            .unwrap_err();
        assert_eq!(fields(&err), vec!["name"]);
    }

    #[test]
    fn test_project_update_accepts_empty_body() {
        let out = PROJECT_UPDATE
            .evaluate(&json!({}), &SanitizationConfig::default())
            .unwrap();
        assert_eq!(out, json!({}));
    }

    #[test]
    fn test_signup_normalizes_email_and_reports_everything() {
        let err = USER_SIGNUP
            .evaluate(&json!({"email": "nope"}), &SanitizationConfig::default())
            .unwrap_err();
        let reported = fields(&err);
        assert!(reported.contains(&"email".to_string()));
        assert!(reported.contains(&"password".to_string()));
        assert!(reported.contains(&"displayName".to_string()));

        let out = USER_SIGNUP
            .evaluate(
                &json!({"email": "  Ann@Example.COM ", "password": "secret1", "displayName": "Ann"}),
                &SanitizationConfig::default(),
            )
            .unwrap();
        assert_eq!(out["email"], "ann@example.com");
    }

    #[test]
    fn test_design_objects_coordinates_are_bounded() {
        let body = json!({
            "projectId": "p1",
            "name": "Living room",
            "objects": [
                {"id": "o1", "position": {"x": 1, "y": 2, "z": 3}},
                {"id": "o2", "rotation": {"y": 1e9}}
            ]
        });
        let err = DESIGN_CREATE
            .evaluate(&body, &SanitizationConfig::default())
            .unwrap_err();
        assert_eq!(fields(&err), vec!["objects[1].rotation.y"]);
    }

    #[test]
    fn test_design_canvas_cap() {
        let config = SanitizationConfig::default().with_max_canvas_bytes(1024);
        let body = json!({
            "projectId": "p1",
            "name": "Big canvas",
            "canvasData": {"layers": "x".repeat(2048)}
        });
        let err = DESIGN_CREATE.evaluate(&body, &config).unwrap_err();
        assert!(err.errors()[0].message.contains("too large"));
    }

    #[test]
    fn test_share_role_must_be_known() {
        let err = COLLABORATION_SHARE
            .evaluate(
                &json!({"email": "b@example.com", "role": "owner"}),
                &SanitizationConfig::default(),
            )
            .unwrap_err();
        assert_eq!(fields(&err), vec!["role"]);
    }

    #[test]
    fn test_favorite_item_id_cannot_contain_slash() {
        let err = FAVORITE_ADD
            .evaluate(&json!({"itemId": "a/b"}), &SanitizationConfig::default())
            .unwrap_err();
        assert_eq!(fields(&err), vec!["itemId"]);
    }

    #[test]
    fn test_furniture_list_converts_prices() {
        let out = FURNITURE_LIST
            .evaluate(
                &json!({"category": "sofa", "minPrice": "10", "maxPrice": "250.5"}),
                &SanitizationConfig::default(),
            )
            .unwrap();
        assert_eq!(out["minPrice"], json!(10));
        assert_eq!(out["maxPrice"], json!(250.5));
    }

    #[test]
    fn test_furniture_create_rejects_internal_model_url_in_production() {
        let body = json!({
            "name": "Armchair",
            "description": "A comfortable armchair",
            "category": "chairs",
            "price": 120,
            "modelUrl": "http://10.0.0.5/model.glb"
        });
        let err = FURNITURE_CREATE
            .evaluate(&body, &SanitizationConfig::production())
            .unwrap_err();
        assert_eq!(fields(&err), vec!["modelUrl"]);
    }
}
