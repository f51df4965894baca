use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    model::Model,
    project::{Project, MODELS_DIR, SCRIPTS_DIR, VIEWS_DIR},
    script::Script,
    view::View,
    xml::parse_record,
};

pub const WIDGET_MODEL_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<model name="Widget">
  <field name="ID" type="Number" required="true" autoIncrement="true"/>
  <field name="Name" type="String" required="false" autoIncrement="false"/>
  <field name="Tags" type="List[String]"/>
  <field name="Created" type="Date" required="true"/>
  <field name="Extra" type="Dynamic"/>
  <dataSource name="AllWidgets" type="QUERY">
    <customQuery>return query.where(&#x22;Name&#x22;, query.params.Filter);</customQuery>
    <parameters>
      <field name="Filter" type="String"/>
    </parameters>
  </dataSource>
  <dataSource name="WidgetCount" type="QUERY">
    <customQuery>return 42;</customQuery>
    <customProperties>
      <field name="Labels" type="List[String]"/>
    </customProperties>
  </dataSource>
  <dataSource name="WidgetTable" type="SQL">
    <customQuery>select * from widget</customQuery>
  </dataSource>
</model>
"#;

pub const ORDER_MODEL_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<model name="Order">
  <field name="ID" type="Number" required="true" autoIncrement="true"/>
  <field name="Total" type="Number"/>
  <field name="Paid" type="Boolean" required="true"/>
  <dataSource name="OpenOrders" type="QUERY">
    <customQuery>return query.where(&#x22;Paid&#x22;, false);</customQuery>
  </dataSource>
</model>
"#;

pub const HOME_VIEW_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<view name="Home" key="view-home" class="LayoutWidget" isViewFragment="false">
  <binding sourceExpression="_dataSource" targetExpression="datasource" targetLiteralExpression="Datasources.AllWidgets"/>
  <customProperty name="Title" type="String"/>
  <customProperty name="Selected" type="List[Number]"/>
  <onLoad><![CDATA[widget.refresh();]]></onLoad>
  <children>
    <component class="SimpleButton">
      <label>Save</label>
      <onClick><![CDATA[widget.view.save(event);]]></onClick>
    </component>
    <component class="Panel">
      <children>
        <component class="Dropdown">
          <onChange><![CDATA[console.log(newValue);]]></onChange>
          <onValidate></onValidate>
        </component>
        <component class="ViewFragment" name="Header">
          <children>
            <component class="SimpleLabel">
              <onClick><![CDATA[alert("hi");]]></onClick>
            </component>
          </children>
        </component>
      </children>
    </component>
  </children>
</view>
"#;

pub const HEADER_FRAGMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<view name="Header" key="view-header" class="LayoutWidget" isViewFragment="true">
  <customProperty name="Caption" type="String" required="true"/>
  <children>
    <component class="MultiSelectBox">
      <onValuesChange><![CDATA[widget.values = newValues;]]></onValuesChange>
    </component>
  </children>
</view>
"#;

pub const ORDERS_VIEW_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<view name="Orders" key="view-orders" class="LayoutWidget" isViewFragment="false">
  <binding sourceExpression="_dataSource" targetExpression="datasource" targetLiteralExpression="OpenOrders"/>
</view>
"#;

pub const UTIL_SCRIPT_XML: &str = r#"
<script key="script-util" type="text/javascript" name="Util"><![CDATA[function formatTotal(total) { return "$" + total }]]></script>"#;

pub const EMPTY_SCRIPT_XML: &str = r#"
<script key="script-empty" type="text/javascript" name="Empty"><![CDATA[]]></script>"#;

const FILES: [(&str, &str, &str); 7] = [
    (MODELS_DIR, "Widget.xml", WIDGET_MODEL_XML),
    (MODELS_DIR, "Order.xml", ORDER_MODEL_XML),
    (VIEWS_DIR, "Home.xml", HOME_VIEW_XML),
    (VIEWS_DIR, "Header.xml", HEADER_FRAGMENT_XML),
    (VIEWS_DIR, "Orders.xml", ORDERS_VIEW_XML),
    (SCRIPTS_DIR, "Util.xml", UTIL_SCRIPT_XML),
    (SCRIPTS_DIR, "Empty.xml", EMPTY_SCRIPT_XML),
];

/// Writes the fixture project into `root`.
pub fn write_project(root: &Path) {
    for (dir, file, contents) in FILES {
        let dir = root.join(dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), contents).unwrap();
    }
}

/// The fixture project with a fixed entity order.
pub fn project() -> Project {
    let root = PathBuf::from("project");
    let path = |dir: &str, file: &str| root.join(dir).join(file);

    let models = [("Widget.xml", WIDGET_MODEL_XML), ("Order.xml", ORDER_MODEL_XML)]
        .iter()
        .map(|(file, xml)| {
            Model::from_record(&parse_record(xml).unwrap(), &path(MODELS_DIR, file)).unwrap()
        })
        .collect();

    let views = [
        ("Home.xml", HOME_VIEW_XML),
        ("Header.xml", HEADER_FRAGMENT_XML),
        ("Orders.xml", ORDERS_VIEW_XML),
    ]
    .iter()
    .map(|(file, xml)| View::from_record(parse_record(xml).unwrap(), &path(VIEWS_DIR, file)).unwrap())
    .collect();

    let scripts = [("Util.xml", UTIL_SCRIPT_XML), ("Empty.xml", EMPTY_SCRIPT_XML)]
        .iter()
        .map(|(file, xml)| {
            Script::from_record(&parse_record(xml).unwrap(), &path(SCRIPTS_DIR, file)).unwrap()
        })
        .collect();

    Project {
        root: root.clone(),
        scripts,
        models,
        views,
    }
}
