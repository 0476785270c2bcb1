pub mod record;
pub mod section;

pub use record::{
    CertificationRecord, EducationRecord, ExperienceRecord, HeaderRecord, ResumeRecord, Skills,
};
pub use section::{Section, SectionKind};
