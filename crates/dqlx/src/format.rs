/// Collapses every run of whitespace into a single space and trims the ends.
///
/// Lets expected queries be written over several indented lines:
///
/// ```
/// let expected = dqlx::minify("
///     query Bladerunner($0:string) {
///         bladerunner(func: eq(name,$0)) { uid name }
///     }
/// ");
/// assert_eq!(expected, "query Bladerunner($0:string) { bladerunner(func: eq(name,$0)) { uid name } }");
/// ```
pub fn minify(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}
