//! Changelog rendering with Jinja-style templates
//!
//! The default template produces a flat bulleted list, or a list per group
//! when any configured group matched at least one record. A user template
//! receives the same [`TemplateData`] and replaces the default entirely.

use minijinja::Environment;

use crate::aggregate::TemplateData;
use crate::error::Error;

/// Built-in changelog template
pub const DEFAULT_TEMPLATE: &str = r#"## {{ version }}
{% if grouped %}
{% for group in grouped %}

### {{ group.name }}

{% for item in group.items %}
* {% if item.commit_url %}[{{ item.commit_short }}]({{ item.commit_url }}){% else %}{{ item.commit_short }}{% endif %} {{ item.title }} ({% if item.is_pull %}{% if item.pull_url %}[contributed]({{ item.pull_url }}){% else %}contributed{% endif %} by {% endif %}{% if item.author_url %}[{{ item.author }}]({{ item.author_url }}){% else %}{{ item.author }}{% endif %})
{% endfor %}
{% endfor %}
{% else %}

{% for item in items %}
* {% if item.commit_url %}[{{ item.commit_short }}]({{ item.commit_url }}){% else %}{{ item.commit_short }}{% endif %} {{ item.title }} ({% if item.is_pull %}{% if item.pull_url %}[contributed]({{ item.pull_url }}){% else %}contributed{% endif %} by {% endif %}{% if item.author_url %}[{{ item.author }}]({{ item.author_url }}){% else %}{{ item.author }}{% endif %})
{% endfor %}
{% endif %}

<em>For more details, see <a href="{{ compare_url }}">{{ previous_version }}..{{ version }}</a></em>
"#;

const TEMPLATE_NAME: &str = "changelog";

/// Render `data` with the given template source.
///
/// Syntax errors in the template are reported as [`Error::Template`].
pub fn render(template: &str, data: &TemplateData) -> Result<String, Error> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.add_template(TEMPLATE_NAME, template)?;

    let output = env.get_template(TEMPLATE_NAME)?.render(data)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::TemplateGroup;
    use crate::change_record::TemplateItem;

    fn item(title: &str, is_pull: bool, pull_url: &str) -> TemplateItem {
        TemplateItem {
            author: "octocat".to_string(),
            author_url: "https://github.com/octocat".to_string(),
            title: title.to_string(),
            date: String::new(),
            is_pull,
            pull_url: pull_url.to_string(),
            commit: "0123456789abcdef".to_string(),
            commit_short: "0123456789".to_string(),
            commit_url: "https://github.com/o/r/commit/0123456789abcdef".to_string(),
            group: String::new(),
        }
    }

    fn data(items: Vec<TemplateItem>, grouped: Vec<TemplateGroup>) -> TemplateData {
        TemplateData {
            version: "v0.2.0".to_string(),
            previous_version: "v0.1.0".to_string(),
            items,
            grouped,
            compare_url: "https://github.com/o/r/compare/v0.1.0...v0.2.0".to_string(),
            diff_url: "https://github.com/o/r/compare/v0.1.0...v0.2.0.diff".to_string(),
            patch_url: "https://github.com/o/r/compare/v0.1.0...v0.2.0.patch".to_string(),
        }
    }

    #[test]
    fn test_render_flat() {
        let output = render(
            DEFAULT_TEMPLATE,
            &data(
                vec![
                    item("Add placeholder args (#12)", true, "https://github.com/o/r/pull/12"),
                    item("Initial commit", false, ""),
                ],
                vec![],
            ),
        )
        .unwrap();

        assert!(output.starts_with("## v0.2.0\n"));
        assert!(output.contains(
            "* [0123456789](https://github.com/o/r/commit/0123456789abcdef) Add placeholder args (#12) ([contributed](https://github.com/o/r/pull/12) by [octocat](https://github.com/octocat))\n"
        ));
        assert!(output.contains(
            "* [0123456789](https://github.com/o/r/commit/0123456789abcdef) Initial commit ([octocat](https://github.com/octocat))\n"
        ));
        assert!(!output.contains("###"));
        assert!(output.contains(
            "<em>For more details, see <a href=\"https://github.com/o/r/compare/v0.1.0...v0.2.0\">v0.1.0..v0.2.0</a></em>"
        ));

        let pull_line = output.find("Add placeholder args").unwrap();
        let initial_line = output.find("Initial commit").unwrap();
        assert!(pull_line < initial_line);
    }

    #[test]
    fn test_render_grouped() {
        let groups = vec![
            TemplateGroup {
                name: "Features".to_string(),
                items: vec![item("Add thing", false, "")],
            },
            TemplateGroup {
                name: "Fixes".to_string(),
                items: vec![item("Fix thing", false, "")],
            },
        ];
        let output = render(
            DEFAULT_TEMPLATE,
            &data(vec![item("Add thing", false, ""), item("Fix thing", false, "")], groups),
        )
        .unwrap();

        let features = output.find("### Features").unwrap();
        let fixes = output.find("### Fixes").unwrap();
        assert!(features < fixes);
        assert!(output[features..fixes].contains("Add thing"));
        assert!(output[fixes..].contains("Fix thing"));
    }

    #[test]
    fn test_render_pull_without_url() {
        let output = render(DEFAULT_TEMPLATE, &data(vec![item("Odd (#3)", true, "")], vec![])).unwrap();
        assert!(output.contains("Odd (#3) (contributed by [octocat]"));
    }

    #[test]
    fn test_render_author_without_url() {
        let mut local = item("Local commit", false, "");
        local.author_url = String::new();
        local.author = "Octo Cat".to_string();
        local.commit_url = String::new();
        let output = render(DEFAULT_TEMPLATE, &data(vec![local], vec![])).unwrap();
        assert!(output.contains("* 0123456789 Local commit (Octo Cat)\n"));
    }

    #[test]
    fn test_render_custom_template() {
        let template = "{{ previous_version }}->{{ version }}:{% for i in items %} {{ i.title }}{% endfor %}";
        let output = render(template, &data(vec![item("One", false, "")], vec![])).unwrap();
        assert_eq!(output, "v0.1.0->v0.2.0: One");
    }

    #[test]
    fn test_render_syntax_error() {
        let result = render("{% for item in items %}", &data(vec![], vec![]));
        assert!(matches!(result, Err(Error::Template(_))));
    }
}
