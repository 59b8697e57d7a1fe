use super::*;

fn images() -> ImageResolver {
    ImageResolver::new("http://api.local")
}

fn sample_user() -> User {
    User {
        id: UserId::from("u-1"),
        first_name: Some("Ada".into()),
        last_name: None,
        email: "ada@example.com".into(),
        age: Some(36),
        gender: Some("Female".into()),
        is_notification: true,
        image: Some("/images/ada.png".into()),
        role: None,
        created_at: None,
    }
}

fn upload(name: &str) -> ImageUpload {
    ImageUpload {
        filename: name.to_string(),
        mime_type: Some("image/png".into()),
        bytes: vec![1, 2, 3],
    }
}

#[test]
fn user_buffer_copies_editable_fields() {
    let buffer = sample_user().derive_buffer(&images());
    assert_eq!(buffer.first_name, "Ada");
    assert_eq!(buffer.last_name, "");
    assert_eq!(buffer.age, "36");
    assert_eq!(buffer.gender, "Female");
    assert!(buffer.is_notification);
    assert_eq!(buffer.image, None);
    assert_eq!(
        buffer.preview,
        ImagePreview::Remote("http://api.local/images/ada.png".into())
    );
}

#[test]
fn picking_an_image_switches_preview_to_pending() {
    let mut buffer = sample_user().derive_buffer(&images());
    User::apply_field(&mut buffer, UserField::Image(upload("new.png")));
    assert_eq!(
        buffer.preview,
        ImagePreview::Pending {
            filename: "new.png".into()
        }
    );

    let patch = User::build_patch(&buffer).expect("valid");
    assert_eq!(patch.image, Some(upload("new.png")));
    assert_eq!(patch.gender, "Female");
    assert_eq!(patch.age, "36");
}

#[test]
fn unrecognised_gender_is_sent_back_unchanged() {
    let mut user = sample_user();
    user.gender = Some("Prefer not to say".into());
    let mut buffer = user.derive_buffer(&images());
    User::apply_field(&mut buffer, UserField::FirstName("Grace".into()));

    let patch = User::build_patch(&buffer).expect("valid");
    assert_eq!(patch.gender, "Prefer not to say");
}

#[test]
fn choosing_a_gender_writes_its_wire_name() {
    let mut buffer = sample_user().derive_buffer(&images());
    User::apply_field(&mut buffer, UserField::Gender(Some(Gender::Other)));
    assert_eq!(buffer.gender, "other");
    User::apply_field(&mut buffer, UserField::Gender(None));
    assert_eq!(User::build_patch(&buffer).expect("valid").gender, "");
}

#[test]
fn non_numeric_age_is_rejected() {
    let mut buffer = sample_user().derive_buffer(&images());
    User::apply_field(&mut buffer, UserField::Age("thirty".into()));
    assert_eq!(
        User::build_patch(&buffer),
        Err(ValidationError::InvalidNumber {
            field: "age",
            value: "thirty".into()
        })
    );

    User::apply_field(&mut buffer, UserField::Age("  ".into()));
    assert_eq!(User::build_patch(&buffer).expect("blank age").age, "");
}

#[test]
fn question_patch_filters_blank_options() {
    let question = Question {
        id: QuestionId::from("q-1"),
        question: "Skin type?".into(),
        options: vec!["x".into(), "".into(), "  ".into(), "y".into()],
        created_at: None,
    };
    let buffer = question.derive_buffer(&images());
    assert_eq!(buffer.options.len(), 4);

    let patch = Question::build_patch(&buffer).expect("valid");
    assert_eq!(patch.options, vec!["x".to_string(), "y".to_string()]);
}

#[test]
fn blank_question_text_is_rejected() {
    let mut buffer = QuestionBuffer::default();
    buffer.apply(QuestionField::Text("   ".into()));
    assert_eq!(
        buffer.payload(),
        Err(ValidationError::EmptyField("question"))
    );
}

#[test]
fn profile_requires_a_name() {
    let profile = Profile {
        id: UserId::from("admin"),
        first_name: None,
        email: "admin@example.com".into(),
        phone: Some("555".into()),
        image: None,
    };
    assert_eq!(profile.display_name(), "Admin");

    let mut buffer = profile.derive_buffer(&images());
    assert_eq!(buffer.preview, ImagePreview::None);
    assert_eq!(
        Profile::build_patch(&buffer),
        Err(ValidationError::EmptyField("firstName"))
    );

    Profile::apply_field(&mut buffer, ProfileField::FirstName("Root".into()));
    let patch = Profile::build_patch(&buffer).expect("valid");
    assert_eq!(patch.first_name, "Root");
    assert_eq!(patch.phone, "555");
}
