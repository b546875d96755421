use marmot_core::Target;

/// Parses targets line by line, blank lines and '#' comments are skipped.
/// An invalid target is reported and skipped.
pub(crate) fn parse_targets<'a, I>(lines: I) -> Vec<Target>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut targets = vec![];
    for line in lines {
        let line = match line.split_once('#') {
            Some((left, _)) => left.trim(),
            None => line.trim(),
        };
        if line.is_empty() {
            continue;
        }
        match line.parse::<Target>() {
            Ok(target) => targets.push(target),
            Err(e) => warn!("skip invalid target '{}': {}", line, e),
        }
    }
    targets
}
