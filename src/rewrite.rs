use crate::placeholder::Locator;
use crate::rules::RuleSet;

/// Splice style tokens from `rules` into a copy of `template`.
///
/// A non-empty `FULL` rule wraps the whole template and nothing else is
/// touched. Otherwise every styled field gets its prefix before and its suffix
/// after the first placeholder that renders it; fields without a placeholder
/// are skipped.
pub fn rewrite(template: &str, rules: &RuleSet) -> String {
    if let Some(full) = rules.whole_message() {
        let mut wrapped =
            String::with_capacity(full.prefix.len() + template.len() + full.suffix.len());
        wrapped.push_str(&full.prefix);
        wrapped.push_str(template);
        wrapped.push_str(&full.suffix);
        return wrapped;
    }

    let mut output = template.to_string();
    for (field, pair) in rules.active_fields() {
        let span = match Locator::new(field).and_then(|locator| locator.locate(&output)) {
            Some(span) => span,
            None => continue,
        };
        // End first: inserting at the start would shift `span.end`
        output.insert_str(span.end, &pair.suffix);
        output.insert_str(span.start, &pair.prefix);
    }
    output
}
