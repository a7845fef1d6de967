#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChallengeLanguage {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Cpp,
    Sql,
}
