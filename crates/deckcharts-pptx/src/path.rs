pub fn rels_for_part(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file_name)) => format!("{dir}/_rels/{file_name}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolve a relationship `Target` against the part that owns the relationship.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    // Part names never carry fragments (`../media/img.png#id`).
    let target = target.split('#').next().unwrap_or(target);
    if target.is_empty() {
        return normalize(source_part);
    }
    if let Some(target) = target.strip_prefix('/') {
        return normalize(target);
    }

    let base_dir = source_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    normalize(&format!("{base_dir}/{target}"))
}

/// Inverse of [`resolve_target`]: the relative `Target` that reaches `target_part` from a
/// relationship owned by `source_part`.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let source = normalize(source_part);
    let target = normalize(target_part);
    let source_dir: Vec<&str> = match source.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let target_segments: Vec<&str> = target.split('/').collect();
    let (target_dir, file_name) = target_segments.split_at(target_segments.len() - 1);

    let common = source_dir
        .iter()
        .zip(target_dir)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out: Vec<&str> = Vec::new();
    out.extend(std::iter::repeat("..").take(source_dir.len() - common));
    out.extend_from_slice(&target_dir[common..]);
    out.extend_from_slice(file_name);
    out.join("/")
}

pub(crate) fn normalize(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rels_for_part_in_root_and_subdir() {
        assert_eq!(rels_for_part("presentation.xml"), "_rels/presentation.xml.rels");
        assert_eq!(
            rels_for_part("ppt/slides/slide1.xml"),
            "ppt/slides/_rels/slide1.xml.rels"
        );
    }

    #[test]
    fn resolve_target_relative_to_source_dir() {
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "../charts/chart1.xml"),
            "ppt/charts/chart1.xml"
        );
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "./../charts/./chart2.xml"),
            "ppt/charts/chart2.xml"
        );
    }

    #[test]
    fn resolve_target_strips_fragments_and_handles_absolute_targets() {
        assert_eq!(
            resolve_target("ppt/charts/chart1.xml", "../embeddings/book.xlsx#Sheet1"),
            "ppt/embeddings/book.xlsx"
        );
        assert_eq!(resolve_target("ppt/charts/chart1.xml", "#x"), "ppt/charts/chart1.xml");
        assert_eq!(
            resolve_target("ppt/charts/chart1.xml", "/ppt/../ppt/charts/colors1.xml"),
            "ppt/charts/colors1.xml"
        );
    }

    #[test]
    fn relative_target_walks_up_to_the_common_dir() {
        assert_eq!(
            relative_target("ppt/slides/slide2.xml", "ppt/charts/chart7.xml"),
            "../charts/chart7.xml"
        );
        assert_eq!(
            relative_target("ppt/charts/chart1.xml", "ppt/embeddings/Microsoft_Excel_Worksheet1.xlsx"),
            "../embeddings/Microsoft_Excel_Worksheet1.xlsx"
        );
        assert_eq!(
            relative_target("ppt/charts/chart1.xml", "ppt/charts/style1.xml"),
            "style1.xml"
        );
        assert_eq!(relative_target("ppt/presentation.xml", "docProps/app.xml"), "../docProps/app.xml");
        assert_eq!(relative_target("root.xml", "ppt/a.xml"), "ppt/a.xml");
    }

    proptest! {
        #[test]
        fn relative_target_resolves_back(
            source in proptest::collection::vec("[a-c]{1,3}", 1..4),
            target in proptest::collection::vec("[a-c]{1,3}", 1..4),
        ) {
            let source = source.join("/");
            let target = target.join("/");
            let relative = relative_target(&source, &target);
            prop_assert_eq!(resolve_target(&source, &relative), target);
        }
    }
}
