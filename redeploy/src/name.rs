fn is_ascii_alphanumeric(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
}

fn is_ascii_alphanumeric_or_separator(byte: u8) -> bool {
    matches!(byte, b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'.' | b'-')
}

/// Returns true if the input matches the regex `^[a-zA-Z0-9][a-zA-Z0-9_.-]*$`, which is what
/// docker accepts for `docker run --name`.
pub fn is_container_name(value: &(impl AsRef<[u8]> + ?Sized)) -> bool {
    fn inner(value: &[u8]) -> bool {
        match value.split_first() {
            None => false,
            Some((&first, rest)) => {
                is_ascii_alphanumeric(first)
                    && rest.iter().copied().all(is_ascii_alphanumeric_or_separator)
            }
        }
    }
    inner(value.as_ref())
}

/// Loose check for an image reference. The container runtime validates the full grammar, this only
/// makes sure the value stays a single argument that can not be mistaken for a flag.
pub fn is_plausible_image_reference(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.chars().any(|c| c.is_whitespace() || c.is_control())
}
