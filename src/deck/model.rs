use crate::{
    core::DeckSchema,
    sink::{
        Model,
        Template,
    },
};

/// Builds the sink model from the deck schema: the configured text fields,
/// the image field last, and one prompt/answer template.
pub fn build_model(schema: &DeckSchema) -> Model {
    let mut fields = schema.fields.clone();
    fields.push(schema.image_field.clone());

    Model {
        id: schema.model_id,
        name: schema.model_name.clone(),
        fields,
        templates: vec![Template {
            name: "Card 1".to_string(),
            qfmt: schema.front_template.clone(),
            afmt: schema.back_template.clone(),
        }],
        css: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_field_comes_last() {
        let model = build_model(&DeckSchema::default());
        assert_eq!(model.fields.len(), 8);
        assert_eq!(model.fields.last().unwrap(), "ImageUrl");
    }
}
