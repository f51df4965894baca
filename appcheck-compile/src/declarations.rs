use std::{
    collections::{btree_map::Entry, BTreeMap},
    fmt::{self, Write},
};

use appcheck::{
    model::{DataSource, Field, Model},
    project::Project,
    view::View,
};
use log::warn;

use crate::{
    error::Error,
    template::{DeclarationTemplate, Hole},
    util::{canonicalize, capitalize, is_ty_list, map_type, type_reference},
};

const VIEW_REFERENCE: &str = "LayoutWidget";
const VIEW_FRAGMENT_REFERENCE: &str = "ViewFragmentWidget";
const DATASOURCE_REFERENCE: &str = "Datasource";
const MISSING_ARGUMENT: &str = "unknown";
const INDENT: &str = "    ";

/// How `List[T]` fields are rendered in a record type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListStyle {
    /// Lists follow the nullability law like every other field.
    Nullable,
    /// `name: List<T> | null` plus an `init<Name>: () => List<T>` accessor.
    WithInit,
    /// `name: List<T>`, never null and without accessor.
    Bare,
}

pub fn field_members(field: &Field, style: ListStyle) -> Vec<String> {
    let ty = map_type(&field.ty);

    if is_ty_list(&field.ty) {
        match style {
            ListStyle::WithInit => {
                return vec![
                    format!("{}: {} | null", field.name, ty),
                    format!("init{}: () => {}", capitalize(&field.name), ty),
                ]
            }
            ListStyle::Bare => return vec![format!("{}: {}", field.name, ty)],
            ListStyle::Nullable => {}
        }
    }

    if field.is_nullable() {
        vec![format!("{}: {} | null", field.name, ty)]
    } else {
        vec![format!("{}: {}", field.name, ty)]
    }
}

/// An object type literal, one member per line when displayed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectType {
    members: Vec<String>,
}

impl ObjectType {
    pub fn new(fields: &[Field], style: ListStyle) -> Self {
        ObjectType {
            members: fields
                .iter()
                .flat_map(|field| field_members(field, style))
                .collect(),
        }
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn push(&mut self, member: String) {
        self.members.push(member);
    }

    /// Single line rendering used for type arguments.
    pub fn inline(&self) -> String {
        if self.members.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", self.members.join("; "))
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.members.is_empty() {
            return write!(f, "{{}}");
        }

        writeln!(f, "{{")?;
        for member in &self.members {
            writeln!(f, "{}{};", INDENT, member)?;
        }
        write!(f, "}}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeAlias {
    pub name: String,
    pub ty: String,
}

impl fmt::Display for TypeAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type {} = {};", self.name, self.ty)
    }
}

/// Every datasource of the project in one namespace, sorted by name.
pub struct DataSourceIndex<'p> {
    entries: BTreeMap<&'p str, DataSourceEntry<'p>>,
}

#[derive(Clone, Copy, Debug)]
pub struct DataSourceEntry<'p> {
    pub model: &'p Model,
    pub data_source: &'p DataSource,
}

impl<'p> DataSourceIndex<'p> {
    /// Fails when two datasources share a name, even across models.
    pub fn build(models: &'p [Model]) -> Result<Self, Error> {
        let mut entries = BTreeMap::new();

        for model in models {
            for data_source in &model.data_sources {
                match entries.entry(data_source.name.as_str()) {
                    Entry::Vacant(vacant) => {
                        vacant.insert(DataSourceEntry { model, data_source });
                    }
                    Entry::Occupied(occupied) => {
                        let existing: &DataSourceEntry = occupied.get();
                        return Err(Error::DuplicateDatasource {
                            name: data_source.name.clone(),
                            first: existing.model.name.clone(),
                            second: model.name.clone(),
                        });
                    }
                }
            }
        }

        Ok(DataSourceIndex { entries })
    }

    pub fn get(&self, name: &str) -> Option<&DataSourceEntry<'p>> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataSourceEntry<'p>> {
        self.entries.values()
    }
}

/// The generated declarations, in output order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeclarationSet {
    pub views: ObjectType,
    pub view_fragments: ObjectType,
    pub datasources: ObjectType,
    pub aliases: Vec<TypeAlias>,
}

impl DeclarationSet {
    pub fn render(&self, template: &DeclarationTemplate) -> String {
        let mut declarations = template.render(|hole| match hole {
            Hole::Views => self.views.to_string(),
            Hole::ViewFragments => self.view_fragments.to_string(),
            Hole::Datasources => self.datasources.to_string(),
        });

        declarations.push('\n');
        for alias in &self.aliases {
            writeln!(declarations, "\n{}", alias).unwrap();
        }

        canonicalize(&declarations)
    }
}

pub struct DeclarationCompiler<'p> {
    models: &'p [Model],
    views: &'p [View],
    data_sources: DataSourceIndex<'p>,
}

impl<'p> DeclarationCompiler<'p> {
    pub fn new(models: &'p [Model], views: &'p [View]) -> Result<Self, Error> {
        Ok(DeclarationCompiler {
            models,
            views,
            data_sources: DataSourceIndex::build(models)?,
        })
    }

    pub fn from_project(project: &'p Project) -> Result<Self, Error> {
        Self::new(&project.models, &project.views)
    }

    pub fn compile(&self, template: &DeclarationTemplate) -> String {
        self.declarations().render(template)
    }

    pub fn declarations(&self) -> DeclarationSet {
        let mut aliases = Vec::new();

        let mut models: Vec<&Model> = self.models.iter().collect();
        models.sort_by(|a, b| a.name.cmp(&b.name));
        aliases.extend(models.into_iter().map(|model| TypeAlias {
            name: model.type_name(),
            ty: ObjectType::new(&model.fields, ListStyle::Nullable).to_string(),
        }));

        aliases.extend(self.data_sources.iter().map(|entry| TypeAlias {
            name: format!("Datasource_{}", entry.data_source.name),
            ty: entry.model.type_name(),
        }));

        aliases.extend(
            self.views
                .iter()
                .filter(|view| !view.custom_properties.is_empty())
                .map(|view| TypeAlias {
                    name: view.custom_properties_type_name(),
                    ty: ObjectType::new(&view.custom_properties, ListStyle::WithInit).to_string(),
                }),
        );

        DeclarationSet {
            views: self.view_members(false),
            view_fragments: self.view_members(true),
            datasources: self.datasource_members(),
            aliases,
        }
    }

    fn view_members(&self, fragments: bool) -> ObjectType {
        let mut members = ObjectType::default();
        for view in self
            .views
            .iter()
            .filter(|view| view.is_view_fragment == fragments)
        {
            members.push(format!("{}: {}", view.name, self.view_reference(view)));
        }

        members
    }

    fn view_reference(&self, view: &View) -> String {
        let reference = if view.is_view_fragment {
            VIEW_FRAGMENT_REFERENCE
        } else {
            VIEW_REFERENCE
        };

        let model = self.bound_model(view).map(Model::type_name);
        let custom_properties = if view.custom_properties.is_empty() {
            None
        } else {
            Some(view.custom_properties_type_name())
        };

        let args = match (model, custom_properties) {
            (model, Some(custom_properties)) => vec![
                model.unwrap_or_else(|| MISSING_ARGUMENT.to_string()),
                custom_properties,
            ],
            (Some(model), None) => vec![model],
            (None, None) => Vec::new(),
        };

        type_reference(reference, &args)
    }

    fn bound_model(&self, view: &View) -> Option<&'p Model> {
        let binding = view.data_source_binding()?;
        let model = binding
            .data_source_name()
            .and_then(|name| self.data_sources.get(name))
            .map(|entry| entry.model);

        if model.is_none() {
            warn!(
                "{} {} binds unknown datasource '{}'",
                view.kind(),
                view.name,
                binding.target_literal_expression
            );
        }

        model
    }

    fn datasource_members(&self) -> ObjectType {
        let mut members = ObjectType::default();
        for entry in self.data_sources.iter() {
            members.push(format!(
                "{}: {}",
                entry.data_source.name,
                datasource_reference(entry)
            ));
        }

        members
    }
}

fn datasource_reference(entry: &DataSourceEntry) -> String {
    let data_source = entry.data_source;
    let parameters = data_source
        .parameters
        .as_ref()
        .map(|fields| ObjectType::new(fields, ListStyle::Nullable).inline());
    let custom_properties = data_source
        .custom_properties
        .as_ref()
        .map(|fields| ObjectType::new(fields, ListStyle::Bare).inline());

    let mut args = vec![entry.model.type_name()];
    match (parameters, custom_properties) {
        (parameters, Some(custom_properties)) => {
            args.push(parameters.unwrap_or_else(|| MISSING_ARGUMENT.to_string()));
            args.push(custom_properties);
        }
        (Some(parameters), None) => args.push(parameters),
        (None, None) => {}
    }

    type_reference(DATASOURCE_REFERENCE, &args)
}

/// Compiles the declaration artifact of a whole project.
pub fn compile_declarations(
    template: &DeclarationTemplate,
    project: &Project,
) -> Result<String, Error> {
    let compiler = DeclarationCompiler::from_project(project)?;
    Ok(compiler.compile(template))
}

#[cfg(test)]
mod test {
    use appcheck::{record::Record, tests_cfg, view::Binding};

    use super::*;

    fn view(name: &str) -> View {
        View {
            name: name.to_string(),
            key: String::new(),
            class: "LayoutWidget".to_string(),
            is_view_fragment: false,
            bindings: Vec::new(),
            custom_properties: Vec::new(),
            root: Record::new("view"),
        }
    }

    fn model(name: &str, fields: Vec<Field>, data_sources: Vec<DataSource>) -> Model {
        Model {
            name: name.to_string(),
            fields,
            data_sources,
        }
    }

    fn query(name: &str) -> DataSource {
        DataSource {
            name: name.to_string(),
            kind: appcheck::model::DataSourceKind::Query,
            custom_query: None,
            parameters: None,
            custom_properties: None,
        }
    }

    #[test]
    fn nullability_law() {
        let nullable = Field::new("X", "Number");
        assert_eq!(field_members(&nullable, ListStyle::Nullable), ["X: number | null"]);

        let required = Field::new("X", "Number").required();
        assert_eq!(field_members(&required, ListStyle::Nullable), ["X: number"]);

        let auto_increment = Field::new("X", "Number").auto_increment();
        assert_eq!(field_members(&auto_increment, ListStyle::Bare), ["X: number"]);
    }

    #[test]
    fn list_init_law() {
        let tags = Field::new("Field", "List[String]");
        assert_eq!(
            field_members(&tags, ListStyle::WithInit),
            ["Field: List<string> | null", "initField: () => List<string>"]
        );
        assert_eq!(field_members(&tags, ListStyle::Bare), ["Field: List<string>"]);
        assert_eq!(
            field_members(&tags, ListStyle::Nullable),
            ["Field: List<string> | null"]
        );
        assert_eq!(
            field_members(&tags.clone().required(), ListStyle::WithInit),
            ["Field: List<string> | null", "initField: () => List<string>"]
        );

        let empty = Field::new("Field", "List[]");
        assert_eq!(
            field_members(&empty, ListStyle::WithInit),
            ["Field: List[] | null"]
        );
    }

    #[test]
    fn object_type_rendering() {
        let fields = [Field::new("A", "Number").required(), Field::new("b", "List[Date]")];
        let object = ObjectType::new(&fields, ListStyle::WithInit);

        assert_eq!(
            object.to_string(),
            "{\n    A: number;\n    b: List<Date> | null;\n    initB: () => List<Date>;\n}"
        );
        assert_eq!(
            object.inline(),
            "{ A: number; b: List<Date> | null; initB: () => List<Date> }"
        );
        assert_eq!(ObjectType::default().to_string(), "{}");
        assert_eq!(ObjectType::default().inline(), "{}");
    }

    #[test]
    fn end_to_end_minimal_project() {
        let models = vec![model(
            "Widget",
            vec![Field::new("ID", "Number").required(), Field::new("Name", "String")],
            Vec::new(),
        )];
        let views = vec![view("Home")];

        let compiler = DeclarationCompiler::new(&models, &views).unwrap();
        let declarations = compiler.compile(&DeclarationTemplate::embedded().unwrap());

        assert!(declarations
            .contains("type Model_Widget = {\n    ID: number;\n    Name: string | null;\n};"));
        assert!(declarations.contains("type Views = {\n    Home: LayoutWidget;\n};"));
        assert!(declarations.contains("type ViewFragments = {};"));
        assert!(declarations.contains("type Datasources = {};"));
        assert!(!declarations.contains("Datasource_"));
    }

    #[test]
    fn fixture_project() {
        let project = tests_cfg::project();
        let declarations =
            compile_declarations(&DeclarationTemplate::embedded().unwrap(), &project).unwrap();

        assert_eq!(
            declarations,
            r#"// Declarations for an exported application.
//
// `Views`, `ViewFragments` and `Datasources` are filled in from the project's
// views and models, the generated model and custom property types follow below.

type Views = {
    Home: LayoutWidget<Model_Widget, Home_View_Custom_Properties>;
    Orders: LayoutWidget;
};

type ViewFragments = {
    Header: ViewFragmentWidget<unknown, Header_ViewFragment_Custom_Properties>;
};

type Datasources = {
    AllWidgets: Datasource<Model_Widget, { Filter: string | null }>;
    OpenOrders: Datasource<Model_Order>;
    WidgetCount: Datasource<Model_Widget, unknown, { Labels: List<string> }>;
    WidgetTable: Datasource<Model_Widget>;
};

declare const views: Views;
declare const viewFragments: ViewFragments;
declare const datasources: Datasources;

type Model_Order = {
    ID: number;
    Total: number | null;
    Paid: boolean;
};

type Model_Widget = {
    ID: number;
    Name: string | null;
    Tags: List<string> | null;
    Created: Date;
    Extra: unknown | null;
};

type Datasource_AllWidgets = Model_Widget;

type Datasource_OpenOrders = Model_Order;

type Datasource_WidgetCount = Model_Widget;

type Datasource_WidgetTable = Model_Widget;

type Home_View_Custom_Properties = {
    Title: string | null;
    Selected: List<number> | null;
    initSelected: () => List<number>;
};

type Header_ViewFragment_Custom_Properties = {
    Caption: string;
};
"#
        );
    }

    #[test]
    fn identical_input_is_byte_identical() {
        let project = tests_cfg::project();
        let template = DeclarationTemplate::embedded().unwrap();
        assert_eq!(
            compile_declarations(&template, &project).unwrap(),
            compile_declarations(&template, &project).unwrap()
        );
    }

    #[test]
    fn custom_properties_keep_view_order() {
        let mut zeta = view("Zeta");
        zeta.custom_properties = vec![Field::new("Z", "String")];
        let mut alpha = view("Alpha");
        alpha.custom_properties = vec![Field::new("A", "String")];
        let views = vec![zeta, alpha];

        let declarations = DeclarationCompiler::new(&[], &views).unwrap().declarations();
        let names: Vec<_> = declarations.aliases.iter().map(|alias| alias.name.as_str()).collect();
        assert_eq!(
            names,
            ["Zeta_View_Custom_Properties", "Alpha_View_Custom_Properties"]
        );
        assert_eq!(
            declarations.views.members(),
            [
                "Zeta: LayoutWidget<unknown, Zeta_View_Custom_Properties>",
                "Alpha: LayoutWidget<unknown, Alpha_View_Custom_Properties>"
            ]
        );
    }

    #[test]
    fn unresolvable_bindings_are_omitted() {
        let models = vec![model("Order", Vec::new(), vec![query("OpenOrders")])];
        let binding = |literal: &str| Binding {
            source_expression: "_dataSource".to_string(),
            target_expression: "datasource".to_string(),
            target_literal_expression: literal.to_string(),
        };

        let mut bound = view("Bound");
        bound.bindings = vec![binding("Datasources.OpenOrders")];
        let mut unknown = view("Unknown");
        unknown.bindings = vec![binding("Datasources.Missing")];
        let mut malformed = view("Malformed");
        malformed.bindings = vec![binding("Datasources.Open.Orders")];
        let views = vec![bound, unknown, malformed];

        let declarations = DeclarationCompiler::new(&models, &views).unwrap().declarations();
        assert_eq!(
            declarations.views.members(),
            [
                "Bound: LayoutWidget<Model_Order>",
                "Unknown: LayoutWidget",
                "Malformed: LayoutWidget"
            ]
        );
    }

    #[test]
    fn datasource_collision_is_rejected() {
        let models = vec![
            model("Widget", Vec::new(), vec![query("All")]),
            model("Order", Vec::new(), vec![query("All")]),
        ];

        let err = DeclarationCompiler::new(&models, &[]).err().unwrap();
        assert_eq!(
            err.to_string(),
            "datasource All is declared by both Widget and Order"
        );
    }

    #[test]
    fn datasource_with_both_shapes() {
        let mut both = query("Both");
        both.parameters = Some(vec![Field::new("Ids", "List[Number]")]);
        both.custom_properties = Some(Vec::new());
        let models = vec![model("M", Vec::new(), vec![both])];

        let index = DataSourceIndex::build(&models).unwrap();
        assert_eq!(index.iter().count(), 1);
        assert_eq!(
            datasource_reference(index.get("Both").unwrap()),
            "Datasource<Model_M, { Ids: List<number> | null }, {}>"
        );
    }
}
