/// The default tag of a field: its name in lowerCamel case.
///
/// A raw identifier prefix is dropped, each underscore starts a new word
/// and the first letter is lowercased.
///
/// # Examples
///
/// ```
/// use vc_serial::schema::lower_camel;
///
/// assert_eq!(lower_camel("max_health"), "maxHealth");
/// assert_eq!(lower_camel("r#type"), "type");
/// assert_eq!(lower_camel("Sprite"), "sprite");
/// ```
pub fn lower_camel(name: &str) -> String {
    let name = name.strip_prefix("r#").unwrap_or(name);
    let mut tag = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = !tag.is_empty();
            continue;
        }
        if tag.is_empty() {
            tag.extend(ch.to_lowercase());
        } else if upper_next {
            tag.extend(ch.to_uppercase());
        } else {
            tag.push(ch);
        }
        upper_next = false;
    }
    tag
}

#[cfg(test)]
mod tests {
    use super::lower_camel;

    #[test]
    fn words() {
        assert_eq!(lower_camel("damage"), "damage");
        assert_eq!(lower_camel("walk_speed_modifier"), "walkSpeedModifier");
        assert_eq!(lower_camel("IsSolid"), "isSolid");
        assert_eq!(lower_camel("_hidden_value"), "hiddenValue");
        assert_eq!(lower_camel("trailing__"), "trailing");
        assert_eq!(lower_camel("r#loop"), "loop");
    }
}
